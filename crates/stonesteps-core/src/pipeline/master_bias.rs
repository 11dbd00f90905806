use std::path::PathBuf;

use tracing::{error, info};

use crate::consts::MASTER_BIAS_SUFFIX;
use crate::error::{Result, StoneStepsError};
use crate::frame::{derived_path, Frame};
use crate::io::fits::write_fits;
use crate::stack::combine;

use super::config::MasterBiasConfig;
use super::helpers::{input_stem, load_frames_reported, output_dir};
use super::types::{NoOpReporter, ProgressReporter, StepOutput, StepStage};

/// Combine bias frames into a master bias.
///
/// A single frame is used as-is. The result keeps the first frame's header
/// with HISTORY lines recording the inputs.
pub fn make_master_bias(frames: &[Frame], config: &MasterBiasConfig) -> Result<Frame> {
    if frames.is_empty() {
        error!("Bias calibration frame not found.");
        return Err(StoneStepsError::EmptyInput("bias".into()));
    }

    let mut master = combine(frames, config.combine_method, None)?;
    master.header = frames[0].header.clone();
    master
        .header
        .push_history(format!("MasterBias: {} files used", frames.len()));
    if frames.len() > 1 {
        master
            .header
            .push_history(format!("MasterBias: combine method {}", config.combine_method));
    }
    Ok(master)
}

/// Load bias frames, combine them and write `<stem>_MBIAS.fits`.
pub fn run_master_bias(inputs: &[PathBuf], config: &MasterBiasConfig) -> Result<StepOutput> {
    run_master_bias_reported(inputs, config, &NoOpReporter)
}

pub fn run_master_bias_reported(
    inputs: &[PathBuf],
    config: &MasterBiasConfig,
    reporter: &dyn ProgressReporter,
) -> Result<StepOutput> {
    config.validate()?;
    let Some(first) = inputs.first() else {
        error!("Bias calibration frame not found.");
        return Err(StoneStepsError::EmptyInput("bias".into()));
    };

    let frames = load_frames_reported(inputs, reporter)?;

    reporter.begin_stage(StepStage::Combining, None);
    let master = make_master_bias(&frames, config)?;
    reporter.finish_stage();

    let dir = output_dir(first, config.output_folder.as_deref())?;
    let path = derived_path(
        &dir,
        &input_stem(first),
        &format!("_{MASTER_BIAS_SUFFIX}"),
        "fits",
    );

    reporter.begin_stage(StepStage::Writing, None);
    write_fits(&master, &path, config.output_format)?;
    reporter.finish_stage();

    info!(
        "Master bias from {} files written to {}",
        frames.len(),
        path.display()
    );
    Ok(StepOutput {
        path,
        frame_count: frames.len(),
        cube: None,
    })
}
