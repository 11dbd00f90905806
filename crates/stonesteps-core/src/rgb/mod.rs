//! RGB compositing: percentile bounds, square-root stretch, channel stacking
//! and labels.

pub mod annotate;
pub mod scale;

use image::{Rgb, RgbImage};
use ndarray::{stack, Array3, Axis};
use tracing::info;

use crate::consts::KEY_COMPLETE;
use crate::error::{Result, StoneStepsError};
use crate::frame::{ensure_shape, Frame};
use crate::header::Header;

pub use annotate::{build_labels, draw_labels, load_font, object_name, Column, Label};
pub use scale::{percentile_rank, scale_bounds, sqrt_scale, sqrt_stretch, PercentileRange, ScaleBounds};

/// Result of compositing three monochrome channels.
#[derive(Clone, Debug)]
pub struct RgbComposite {
    pub bounds: ScaleBounds,
    /// 8-bit composite without labels
    pub image: RgbImage,
    /// Unscaled channel data, shape = (height, width, 3)
    pub cube: Array3<f32>,
    /// First channel's header plus `COMPLETE = 1`
    pub header: Header,
    pub labels: Vec<Label>,
}

impl RgbComposite {
    /// Copy of the composite with the labels drawn on it.
    pub fn annotated(&self, font: &ab_glyph::FontArc) -> RgbImage {
        let mut img = self.image.clone();
        draw_labels(&mut img, &self.labels, font);
        img
    }
}

/// Composite red, green and blue frames into an 8-bit RGB image.
///
/// The object label is taken from the red frame's file name, the observer
/// and observatory labels from its header.
pub fn compose(red: &Frame, green: &Frame, blue: &Frame, range: PercentileRange) -> Result<RgbComposite> {
    range.validate()?;
    let channels = [red, green, blue];
    for c in &channels[1..] {
        ensure_shape(red.dim(), c)?;
    }
    if red.data.is_empty() {
        return Err(StoneStepsError::InvalidInput("RGB channels are empty".into()));
    }

    let bounds = scale_bounds(channels, range)?;
    info!(
        "Scale min r/g/b: {}/{}/{}",
        bounds.channel_min[0], bounds.channel_min[1], bounds.channel_min[2]
    );
    info!("Scale max: {}", bounds.max);

    let [r, g, b] = [0usize, 1, 2].map(|i| sqrt_stretch(channels[i], bounds.channel_min[i], bounds.max));
    let (h, w) = red.dim();
    let image = RgbImage::from_fn(w as u32, h as u32, |x, y| {
        let (row, col) = (y as usize, x as usize);
        Rgb([r[[row, col]], g[[row, col]], b[[row, col]]])
    });

    let cube = stack(
        Axis(2),
        &[red.data.view(), green.data.view(), blue.data.view()],
    )
    .map_err(|e| StoneStepsError::InvalidInput(e.to_string()))?;

    let mut header = red.header.clone();
    header.set_with_comment(
        KEY_COMPLETE,
        1i64,
        Some("Data Reduction Pipe: Complete Data Flag"),
    );

    let labels = build_labels(
        &object_name(&red.file_stem()),
        &header,
        [&red.header, &green.header, &blue.header],
    );

    Ok(RgbComposite {
        bounds,
        image,
        cube,
        header,
        labels,
    })
}
