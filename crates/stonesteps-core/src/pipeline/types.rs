use std::path::PathBuf;

/// Step processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStage {
    Resolving,
    Loading,
    Calibrating,
    Normalizing,
    Combining,
    Compositing,
    Annotating,
    Writing,
}

impl std::fmt::Display for StepStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolving => write!(f, "Resolving calibration files"),
            Self::Loading => write!(f, "Loading frames"),
            Self::Calibrating => write!(f, "Subtracting bias and dark"),
            Self::Normalizing => write!(f, "Normalizing flats"),
            Self::Combining => write!(f, "Combining"),
            Self::Compositing => write!(f, "Compositing channels"),
            Self::Annotating => write!(f, "Drawing labels"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Files produced by a step run.
#[derive(Clone, Debug)]
pub struct StepOutput {
    /// Main product (master FITS frame or RGB raster)
    pub path: PathBuf,
    /// Number of input frames used
    pub frame_count: usize,
    /// Optional float cube written next to an RGB composite
    pub cube: Option<PathBuf>,
}

/// Progress reporting for the step drivers.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter {
    /// A new stage has started. `total_items` is the number of work items
    /// in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: StepStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when the plain `run_*` functions delegate.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
