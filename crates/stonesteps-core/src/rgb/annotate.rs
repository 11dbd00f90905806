//! Text labels drawn onto RGB composites.

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

use crate::consts::{
    KEY_FILTER, KEY_OBSERVATORY, KEY_OBSERVER, LABEL_HEIGHT_DIVISOR, LABEL_LEFT_X_DIVISOR,
    LABEL_RIGHT_X_DIVISOR, LABEL_ROW_Y_DIVISORS,
};
use crate::error::{Result, StoneStepsError};
use crate::header::Header;

const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

/// One line of text and its slot in the bottom label block.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub column: Column,
    pub row: usize,
}

impl Label {
    fn new(text: String, column: Column, row: usize) -> Self {
        Self { text, column, row }
    }

    /// Top-left pixel of the text for an image of the given size.
    pub fn position(&self, width: u32, height: u32) -> (i32, i32) {
        let x_div = match self.column {
            Column::Left => LABEL_LEFT_X_DIVISOR,
            Column::Right => LABEL_RIGHT_X_DIVISOR,
        };
        let y_div = LABEL_ROW_Y_DIVISORS[self.row.min(LABEL_ROW_Y_DIVISORS.len() - 1)];
        ((width as f32 / x_div) as i32, (height as f32 / y_div) as i32)
    }
}

/// Object name from a file stem: first `_`-delimited token, first letter
/// upper-cased (`m51_r_0001` -> `M51`).
pub fn object_name(stem: &str) -> String {
    let token = stem.split('_').next().unwrap_or_default();
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the label set.
///
/// Left column: object, observer and observatory (from `output`). Right
/// column: the filter of each channel, from that channel's own header. A
/// line whose keyword is absent is left out.
pub fn build_labels(object: &str, output: &Header, channels: [&Header; 3]) -> Vec<Label> {
    let mut labels = vec![Label::new(format!("Object:  {object}"), Column::Left, 0)];

    if let Some(observer) = output.get(KEY_OBSERVER) {
        labels.push(Label::new(format!("Observer:  {observer}"), Column::Left, 1));
    }
    if let Some(observatory) = output.get(KEY_OBSERVATORY) {
        labels.push(Label::new(
            format!("Observatory:  {observatory}"),
            Column::Left,
            2,
        ));
    }

    for (row, (name, header)) in ["R", "G", "B"].iter().zip(channels).enumerate() {
        if let Some(filter) = header.get(KEY_FILTER) {
            labels.push(Label::new(format!("{name}:  {filter}"), Column::Right, row));
        }
    }
    labels
}

/// Label text height in pixels for an image `height` pixels tall.
pub fn label_scale(height: u32) -> f32 {
    (height as f32 / LABEL_HEIGHT_DIVISOR).max(1.0)
}

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes).map_err(|e| {
        StoneStepsError::InvalidConfig(format!("cannot parse font {}: {e}", path.display()))
    })
}

/// Draw labels in white onto `img`.
pub fn draw_labels(img: &mut RgbImage, labels: &[Label], font: &FontArc) {
    let (width, height) = img.dimensions();
    let scale = PxScale::from(label_scale(height));
    for label in labels {
        let (x, y) = label.position(width, height);
        draw_text_mut(img, LABEL_COLOR, x, y, scale, font, &label.text);
    }
}
