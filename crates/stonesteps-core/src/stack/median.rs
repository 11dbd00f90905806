use crate::error::{Result, StoneStepsError};
use crate::frame::Frame;

use super::reduce_pixels;

/// Stack frames by computing the median at each pixel position.
///
/// Uses `select_nth_unstable` for O(n) median without full sort. An even
/// count yields the mean of the two middle values.
pub fn median_stack(frames: &[Frame], scales: Option<&[f32]>) -> Result<Frame> {
    if frames.is_empty() {
        return Err(StoneStepsError::EmptyInput("median".into()));
    }
    let data = reduce_pixels(frames, scales, |values| {
        median_of(values).unwrap_or(f32::NAN)
    });
    Ok(frames[0].with_data(data))
}

/// Median of `values`, reordering them in place. `None` when empty.
pub fn median_of(values: &mut [f32]) -> Option<f32> {
    let n = values.len();
    match n {
        0 => None,
        1 => Some(values[0]),
        _ if n % 2 == 1 => {
            let mid = n / 2;
            Some(*values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1)
        }
        _ => {
            let mid = n / 2;
            values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            let upper = values[mid];
            let lower = *values[..mid]
                .select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b))
                .1;
            Some((lower + upper) / 2.0)
        }
    }
}
