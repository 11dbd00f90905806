use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_PERCENTILE, DEFAULT_MIN_PERCENTILE};
use crate::error::{Result, StoneStepsError};
use crate::frame::Frame;

/// Lower and upper scaling percentiles, as fractions in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentileRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PercentileRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_PERCENTILE,
            max: DEFAULT_MAX_PERCENTILE,
        }
    }
}

impl PercentileRange {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("min_percentile", self.min), ("max_percentile", self.max)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(StoneStepsError::InvalidConfig(format!(
                    "{name} must be a fraction in [0, 1], got {v}"
                )));
            }
        }
        if self.min > self.max {
            return Err(StoneStepsError::InvalidConfig(format!(
                "min_percentile {} exceeds max_percentile {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Display bounds: one minimum per channel, one maximum shared by all three.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBounds {
    pub channel_min: [f32; 3],
    pub max: f32,
}

/// Index of the value at `fraction` of a sorted array of `len` values,
/// clamped to the last index. `len` must be non-zero.
pub fn percentile_rank(fraction: f64, len: usize) -> usize {
    ((fraction * len as f64) as usize).min(len - 1)
}

/// Finite values, sorted ascending. NaN and infinities are masked out.
fn sorted_finite<'a>(values: impl Iterator<Item = &'a f32>) -> Vec<f32> {
    let mut sorted: Vec<f32> = values.copied().filter(|v| v.is_finite()).collect();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    sorted
}

/// Per-channel minimums at `range.min` of each channel's own distribution,
/// shared maximum at `range.max` of the union of all three channels.
///
/// Ranks are taken over finite pixels only. A channel without any finite
/// pixel is `InvalidData`.
pub fn scale_bounds(channels: [&Frame; 3], range: PercentileRange) -> Result<ScaleBounds> {
    if channels[0].data.is_empty() {
        return Err(StoneStepsError::InvalidInput("RGB channels are empty".into()));
    }

    let mut channel_min = [0.0f32; 3];
    for (min, channel) in channel_min.iter_mut().zip(channels) {
        let sorted = sorted_finite(channel.data.iter());
        if sorted.is_empty() {
            return Err(StoneStepsError::InvalidData {
                path: channel.path.clone(),
                reason: "channel has no finite pixels".into(),
            });
        }
        *min = sorted[percentile_rank(range.min, sorted.len())];
    }

    let all = sorted_finite(channels.iter().flat_map(|c| c.data.iter()));
    let max = all[percentile_rank(range.max, all.len())];

    Ok(ScaleBounds { channel_min, max })
}

/// Square-root stretch of one value from `[min, max]` to `0..=255`.
///
/// Values are clamped to the bounds first; the result is truncated. A
/// degenerate range (`max <= min`) maps everything to 0.
pub fn sqrt_scale(value: f32, min: f32, max: f32) -> u8 {
    let range = max as f64 - min as f64;
    if range.is_nan() || range <= 0.0 {
        return 0;
    }
    let offset = (value as f64).clamp(min as f64, max as f64) - min as f64;
    (255.0 * (offset / range).sqrt()) as u8
}

/// Apply [`sqrt_scale`] to every pixel of a channel.
pub fn sqrt_stretch(frame: &Frame, min: f32, max: f32) -> Array2<u8> {
    frame.data.mapv(|v| sqrt_scale(v, min, max))
}
