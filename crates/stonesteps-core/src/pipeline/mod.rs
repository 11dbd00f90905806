//! Step drivers: resolve inputs, run the in-memory algorithms, write the
//! products. Nothing is written when a step fails.

pub mod auxiliary;
pub mod config;
mod composite;
mod helpers;
mod master_bias;
mod master_flat;
mod types;

pub use composite::{make_rgb, run_rgb, run_rgb_reported};
pub use master_bias::{make_master_bias, run_master_bias, run_master_bias_reported};
pub use master_flat::{
    make_master_flat, make_master_flat_reported, run_master_flat, run_master_flat_reported,
};
pub use types::{NoOpReporter, ProgressReporter, StepOutput, StepStage};
