//! Master-frame combination: reduce a stack of same-shape frames to one
//! frame with a per-pixel median, average, or sum.
//!
//! Non-finite pixels are treated as masked and left out of each pixel's
//! reduction. A pixel masked in every input stays NaN.

pub mod mean;
pub mod median;

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{Result, StoneStepsError};
use crate::frame::{ensure_uniform_shape, Frame};

pub use mean::{average_stack, sum_stack};
pub use median::{median_of, median_stack};

/// Per-pixel reduction applied across a frame stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMethod {
    #[default]
    Median,
    #[serde(alias = "mean")]
    Average,
    Sum,
}

impl std::fmt::Display for CombineMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Median => write!(f, "median"),
            Self::Average => write!(f, "average"),
            Self::Sum => write!(f, "sum"),
        }
    }
}

impl std::str::FromStr for CombineMethod {
    type Err = StoneStepsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "median" => Ok(Self::Median),
            "average" | "mean" => Ok(Self::Average),
            "sum" => Ok(Self::Sum),
            other => Err(StoneStepsError::InvalidConfig(format!(
                "unknown combine method '{other}' (expected median, average or sum)"
            ))),
        }
    }
}

/// Combine a frame set into one frame.
///
/// A single frame is returned unchanged. Otherwise every frame is multiplied
/// by its entry in `scales` (when given) and the stack is reduced with
/// `method`. The result carries the first frame's header and path.
pub fn combine(frames: &[Frame], method: CombineMethod, scales: Option<&[f32]>) -> Result<Frame> {
    if frames.is_empty() {
        return Err(StoneStepsError::EmptyInput("input".into()));
    }
    ensure_uniform_shape(frames)?;
    if let Some(s) = scales {
        if s.len() != frames.len() {
            return Err(StoneStepsError::InvalidConfig(format!(
                "{} scale factors given for {} frames",
                s.len(),
                frames.len()
            )));
        }
    }

    if frames.len() == 1 {
        return Ok(frames[0].clone());
    }

    debug!("Combining {} frames ({})", frames.len(), method);
    match method {
        CombineMethod::Median => median_stack(frames, scales),
        CombineMethod::Average => average_stack(frames, scales),
        CombineMethod::Sum => sum_stack(frames, scales),
    }
}

/// Apply `reduce` to the finite, scaled values of every pixel position.
///
/// `reduce` receives a non-empty slice; positions with no finite value
/// become NaN. Parallelizes at the row level for images >= 256x256.
pub(crate) fn reduce_pixels<F>(frames: &[Frame], scales: Option<&[f32]>, reduce: F) -> Array2<f32>
where
    F: Fn(&mut [f32]) -> f32 + Sync,
{
    let (h, w) = frames[0].dim();
    let n = frames.len();

    let reduce_row = |row: usize, pixel_values: &mut Vec<f32>, out: &mut [f32]| {
        for (col, result) in out.iter_mut().enumerate() {
            pixel_values.clear();
            for (i, frame) in frames.iter().enumerate() {
                let v = frame.data[[row, col]] * scales.map_or(1.0, |s| s[i]);
                if v.is_finite() {
                    pixel_values.push(v);
                }
            }
            *result = if pixel_values.is_empty() {
                f32::NAN
            } else {
                reduce(pixel_values.as_mut_slice())
            };
        }
    };

    let mut result = Array2::<f32>::zeros((h, w));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        // Row-parallel: each row allocates its own pixel_values
        result
            .axis_iter_mut(ndarray::Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut out)| {
                let mut pixel_values = Vec::with_capacity(n);
                if let Some(slice) = out.as_slice_mut() {
                    reduce_row(row, &mut pixel_values, slice);
                }
            });
    } else {
        let mut pixel_values = Vec::with_capacity(n);
        for (row, mut out) in result.axis_iter_mut(ndarray::Axis(0)).enumerate() {
            if let Some(slice) = out.as_slice_mut() {
                reduce_row(row, &mut pixel_values, slice);
            }
        }
    }
    result
}
