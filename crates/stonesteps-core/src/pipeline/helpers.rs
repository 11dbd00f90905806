use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::frame::Frame;
use crate::io::fits::read_fits;

use super::auxiliary::expand_path;
use super::types::{ProgressReporter, StepStage};

/// Read every input in order, reporting one item per file.
pub(super) fn load_frames_reported(
    inputs: &[PathBuf],
    reporter: &dyn ProgressReporter,
) -> Result<Vec<Frame>> {
    reporter.begin_stage(StepStage::Loading, Some(inputs.len()));
    let mut frames = Vec::with_capacity(inputs.len());
    for (i, path) in inputs.iter().enumerate() {
        debug!("Input filename = {}", path.display());
        frames.push(read_fits(path)?);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();
    Ok(frames)
}

/// Directory the step writes into: the configured folder (created if
/// missing) or the folder of the first input.
pub(super) fn output_dir(first_input: &Path, folder: Option<&Path>) -> Result<PathBuf> {
    match folder {
        Some(folder) => {
            let dir = expand_path(folder);
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        }
        None => Ok(first_input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))),
    }
}

/// File stem of an input path.
pub(super) fn input_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
