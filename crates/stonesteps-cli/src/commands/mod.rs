pub mod config;
pub mod info;
pub mod master_bias;
pub mod master_flat;
pub mod rgb;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::debug;
use stonesteps_core::frame::SampleFormat;
use stonesteps_core::pipeline::config::StepsConfig;
use stonesteps_core::stack::CombineMethod;

/// Load `--config` if given, else the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<StepsConfig> {
    match path {
        Some(p) => {
            debug!("Loading step configuration from {}", p.display());
            StepsConfig::from_file(p)
                .with_context(|| format!("Failed to load config from {}", p.display()))
        }
        None => Ok(StepsConfig::default()),
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CombineMethodArg {
    Median,
    Average,
    Sum,
}

impl From<CombineMethodArg> for CombineMethod {
    fn from(arg: CombineMethodArg) -> Self {
        match arg {
            CombineMethodArg::Median => Self::Median,
            CombineMethodArg::Average => Self::Average,
            CombineMethodArg::Sum => Self::Sum,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SampleFormatArg {
    U8,
    I16,
    U16,
    I32,
    F32,
    F64,
}

impl From<SampleFormatArg> for SampleFormat {
    fn from(arg: SampleFormatArg) -> Self {
        match arg {
            SampleFormatArg::U8 => Self::U8,
            SampleFormatArg::I16 => Self::I16,
            SampleFormatArg::U16 => Self::U16,
            SampleFormatArg::I32 => Self::I32,
            SampleFormatArg::F32 => Self::F32,
            SampleFormatArg::F64 => Self::F64,
        }
    }
}
