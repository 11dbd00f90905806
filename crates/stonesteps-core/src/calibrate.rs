//! Bias and exposure-scaled dark subtraction.

use tracing::debug;

use crate::consts::KEY_EXPTIME;
use crate::error::{Result, StoneStepsError};
use crate::frame::Frame;

/// Matched master bias and master dark used to correct a frame.
#[derive(Clone, Debug)]
pub struct CalibrationPair {
    pub bias: Frame,
    pub dark: Frame,
}

impl CalibrationPair {
    pub fn new(bias: Frame, dark: Frame) -> Self {
        Self { bias, dark }
    }
}

/// Subtract a bias frame pixel-wise.
pub fn subtract_bias(frame: &Frame, bias: &Frame) -> Result<Frame> {
    frame.ensure_same_shape(bias)?;
    Ok(frame.with_data(&frame.data - &bias.data))
}

/// Subtract a dark frame scaled by `frame.EXPTIME / dark.EXPTIME`.
pub fn subtract_dark(frame: &Frame, dark: &Frame) -> Result<Frame> {
    frame.ensure_same_shape(dark)?;
    let scale = dark_scale(frame, dark)?;
    debug!(
        "Dark scale for {}: {:.4}",
        frame.path.display(),
        scale
    );
    let scale = scale as f32;
    Ok(frame.with_data(&frame.data - &dark.data.mapv(|d| d * scale)))
}

/// Bias-subtract, then subtract the exposure-scaled dark.
pub fn calibrate(frame: &Frame, pair: &CalibrationPair) -> Result<Frame> {
    let debiased = subtract_bias(frame, &pair.bias)?;
    subtract_dark(&debiased, &pair.dark)
}

/// Ratio of the frame's exposure time to the dark's.
pub fn dark_scale(frame: &Frame, dark: &Frame) -> Result<f64> {
    let exposure = frame.exposure_time()?;
    let dark_exposure = dark.exposure_time()?;
    if dark_exposure.is_nan() || dark_exposure <= 0.0 {
        return Err(StoneStepsError::InvalidMetadata {
            key: KEY_EXPTIME.into(),
            path: dark.path.clone(),
            reason: format!("dark exposure time must be positive, got {dark_exposure}"),
        });
    }
    Ok(exposure / dark_exposure)
}
