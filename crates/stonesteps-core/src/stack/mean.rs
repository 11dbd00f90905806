use crate::error::{Result, StoneStepsError};
use crate::frame::Frame;

use super::reduce_pixels;

/// Stack frames by computing the mean at each pixel.
pub fn average_stack(frames: &[Frame], scales: Option<&[f32]>) -> Result<Frame> {
    if frames.is_empty() {
        return Err(StoneStepsError::EmptyInput("average".into()));
    }
    let data = reduce_pixels(frames, scales, |values| {
        values.iter().sum::<f32>() / values.len() as f32
    });
    Ok(frames[0].with_data(data))
}

/// Stack frames by summing each pixel.
pub fn sum_stack(frames: &[Frame], scales: Option<&[f32]>) -> Result<Frame> {
    if frames.is_empty() {
        return Err(StoneStepsError::EmptyInput("sum".into()));
    }
    let data = reduce_pixels(frames, scales, |values| values.iter().sum());
    Ok(frames[0].with_data(data))
}
