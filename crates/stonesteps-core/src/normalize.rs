//! Flat-field brightness normalization.

use ndarray::ArrayView2;

use crate::consts::FLAT_TARGET_MEDIAN;
use crate::error::{Result, StoneStepsError};
use crate::frame::Frame;
use crate::stack::median_of;

/// Median over the finite pixels of `data`; `None` when every pixel is masked.
pub fn masked_median(data: ArrayView2<f32>) -> Option<f32> {
    let mut values: Vec<f32> = data.iter().copied().filter(|v| v.is_finite()).collect();
    median_of(&mut values)
}

/// Scale factor bringing `frame`'s median to `target`.
pub fn scale_factor(frame: &Frame, target: f32) -> Result<f32> {
    let median = masked_median(frame.data.view()).ok_or_else(|| StoneStepsError::InvalidData {
        path: frame.path.clone(),
        reason: "no valid pixels to normalize".into(),
    })?;
    if median == 0.0 {
        return Err(StoneStepsError::InvalidData {
            path: frame.path.clone(),
            reason: "median is zero, cannot normalize".into(),
        });
    }
    Ok(target / median)
}

/// Per-flat factors `10000 / median`, in input order.
pub fn flat_scale_factors(frames: &[Frame]) -> Result<Vec<f32>> {
    frames
        .iter()
        .map(|f| scale_factor(f, FLAT_TARGET_MEDIAN))
        .collect()
}
