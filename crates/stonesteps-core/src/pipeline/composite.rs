use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{Result, StoneStepsError};
use crate::frame::{derived_path, Frame};
use crate::io::fits::write_fits_cube;
use crate::io::image_io::save_rgb;
use crate::rgb::{compose, load_font, RgbComposite};

use super::config::RgbConfig;
use super::helpers::{input_stem, load_frames_reported, output_dir};
use super::types::{NoOpReporter, ProgressReporter, StepOutput, StepStage};

/// Composite exactly three frames, ordered red, green, blue.
pub fn make_rgb(frames: &[Frame], config: &RgbConfig) -> Result<RgbComposite> {
    check_channel_count(frames.len())?;
    compose(&frames[0], &frames[1], &frames[2], config.percentiles())
}

fn check_channel_count(n: usize) -> Result<()> {
    match n {
        0 => {
            error!("No RGB input frames found.");
            Err(StoneStepsError::EmptyInput("RGB".into()))
        }
        COLOR_CHANNEL_COUNT => Ok(()),
        n => Err(StoneStepsError::InvalidInput(format!(
            "RGB compositing needs {COLOR_CHANNEL_COUNT} frames (red, green, blue), got {n}"
        ))),
    }
}

/// Build the composite, draw labels and write `<stem>.jpg` (or `.png`).
pub fn run_rgb(inputs: &[PathBuf], config: &RgbConfig) -> Result<StepOutput> {
    run_rgb_reported(inputs, config, &NoOpReporter)
}

pub fn run_rgb_reported(
    inputs: &[PathBuf],
    config: &RgbConfig,
    reporter: &dyn ProgressReporter,
) -> Result<StepOutput> {
    config.validate()?;
    check_channel_count(inputs.len())?;
    let first = &inputs[0];
    info!("Number of input files = {}", inputs.len());

    let frames = load_frames_reported(inputs, reporter)?;

    reporter.begin_stage(StepStage::Compositing, None);
    let composite = make_rgb(&frames, config)?;
    reporter.finish_stage();

    reporter.begin_stage(StepStage::Annotating, None);
    let image = match load_font(&config.font_path) {
        Ok(font) => composite.annotated(&font),
        Err(e) => {
            warn!(
                "Cannot load label font {}: {}; writing composite without labels",
                config.font_path.display(),
                e
            );
            composite.image.clone()
        }
    };
    reporter.finish_stage();

    let dir = output_dir(first, config.output_folder.as_deref())?;
    let stem = input_stem(first);
    let path = derived_path(&dir, &stem, "", config.image_format.extension());

    reporter.begin_stage(StepStage::Writing, None);
    let cube = if config.save_cube {
        let cube_path = derived_path(&dir, &stem, "_cube", "fits");
        write_fits_cube(&composite.cube, &composite.header, &cube_path)?;
        Some(cube_path)
    } else {
        None
    };
    if let Err(e) = save_rgb(&image, &path, config.image_format) {
        // a failed step leaves nothing behind
        if let Some(cube_path) = &cube {
            if let Err(rm) = std::fs::remove_file(cube_path) {
                warn!("Cannot remove {}: {}", cube_path.display(), rm);
            }
        }
        error!("Cannot write RGB composite {}: {}", path.display(), e);
        return Err(e);
    }
    reporter.finish_stage();

    info!("RGB composite written to {}", path.display());
    Ok(StepOutput {
        path,
        frame_count: frames.len(),
        cube,
    })
}
