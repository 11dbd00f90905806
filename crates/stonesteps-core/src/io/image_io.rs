use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoneStepsError};

/// JPEG quality used for composites.
pub const JPEG_QUALITY: u8 = 95;

/// Compressed raster format for RGB composites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    #[default]
    Jpeg,
    Png,
}

impl RasterFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl std::fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "JPEG"),
            Self::Png => write!(f, "PNG"),
        }
    }
}

impl std::str::FromStr for RasterFormat {
    type Err = StoneStepsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(StoneStepsError::InvalidConfig(format!(
                "unknown image format '{other}' (expected jpeg or png)"
            ))),
        }
    }
}

/// Save an 8-bit RGB image as JPEG.
pub fn save_rgb_jpeg(img: &RgbImage, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    img.write_with_encoder(encoder)?;
    Ok(())
}

/// Save an 8-bit RGB image as PNG.
pub fn save_rgb_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save an 8-bit RGB image in the given format.
pub fn save_rgb(img: &RgbImage, path: &Path, format: RasterFormat) -> Result<()> {
    match format {
        RasterFormat::Jpeg => save_rgb_jpeg(img, path)?,
        RasterFormat::Png => save_rgb_png(img, path)?,
    }
    debug!("Wrote {} {}", format, path.display());
    Ok(())
}
