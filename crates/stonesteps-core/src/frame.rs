use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::KEY_EXPTIME;
use crate::error::{Result, StoneStepsError};
use crate::header::Header;

/// A single monochrome exposure.
/// Pixel values are f32 in the file's physical units (BSCALE/BZERO applied).
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Header cards of the primary HDU
    pub header: Header,
    /// File the frame was read from, or the file it will be written to
    pub path: PathBuf,
    /// On-disk sample format the pixels were decoded from
    pub source_format: SampleFormat,
}

impl Frame {
    pub fn new(data: Array2<f32>, header: Header) -> Self {
        Self {
            data,
            header,
            path: PathBuf::new(),
            source_format: SampleFormat::F32,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Same header and provenance, different pixels.
    pub fn with_data(&self, data: Array2<f32>) -> Self {
        Self {
            data,
            header: self.header.clone(),
            path: self.path.clone(),
            source_format: self.source_format,
        }
    }

    /// Exposure time in seconds from `EXPTIME`.
    pub fn exposure_time(&self) -> Result<f64> {
        self.header
            .get_f64(KEY_EXPTIME)
            .ok_or_else(|| StoneStepsError::MissingMetadata {
                key: KEY_EXPTIME.into(),
                path: self.path.clone(),
            })
    }

    /// File name without directory and extension.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Fail with `ShapeMismatch` unless `other` has this frame's dimensions.
    pub fn ensure_same_shape(&self, other: &Frame) -> Result<()> {
        ensure_shape(self.dim(), other)
    }
}

/// Fail with `ShapeMismatch` unless `frame` has shape `expected`.
pub fn ensure_shape(expected: (usize, usize), frame: &Frame) -> Result<()> {
    let found = frame.dim();
    if found == expected {
        return Ok(());
    }
    Err(StoneStepsError::ShapeMismatch {
        path: frame.path.clone(),
        expected_h: expected.0,
        expected_w: expected.1,
        found_h: found.0,
        found_w: found.1,
    })
}

/// Validate that every frame in the set has the first frame's shape.
pub fn ensure_uniform_shape(frames: &[Frame]) -> Result<()> {
    let Some(first) = frames.first() else {
        return Ok(());
    };
    frames[1..]
        .iter()
        .try_for_each(|f| ensure_shape(first.dim(), f))
}

/// FITS sample encoding (BITPIX plus the unsigned-16 BZERO convention).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    U8,
    I16,
    /// Stored as BITPIX 16 with BZERO = 32768
    U16,
    I32,
    #[default]
    F32,
    F64,
}

impl SampleFormat {
    pub fn bitpix(self) -> i64 {
        match self {
            Self::U8 => 8,
            Self::I16 | Self::U16 => 16,
            Self::I32 => 32,
            Self::F32 => -32,
            Self::F64 => -64,
        }
    }

    /// BZERO written for this format, if any.
    pub fn bzero(self) -> Option<f64> {
        match self {
            Self::U16 => Some(32768.0),
            _ => None,
        }
    }

    /// Physical value range representable after BZERO is applied.
    pub fn value_range(self) -> (f64, f64) {
        match self {
            Self::U8 => (0.0, u8::MAX as f64),
            Self::I16 => (i16::MIN as f64, i16::MAX as f64),
            Self::U16 => (0.0, u16::MAX as f64),
            Self::I32 => (i32::MIN as f64, i32::MAX as f64),
            Self::F32 => (f32::MIN as f64, f32::MAX as f64),
            Self::F64 => (f64::MIN, f64::MAX),
        }
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::I16 => write!(f, "i16"),
            Self::U16 => write!(f, "u16"),
            Self::I32 => write!(f, "i32"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

impl std::str::FromStr for SampleFormat {
    type Err = StoneStepsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "u8" => Ok(Self::U8),
            "i16" => Ok(Self::I16),
            "u16" => Ok(Self::U16),
            "i32" => Ok(Self::I32),
            "f32" => Ok(Self::F32),
            "f64" => Ok(Self::F64),
            other => Err(StoneStepsError::InvalidConfig(format!(
                "unknown sample format '{other}' (expected u8, i16, u16, i32, f32 or f64)"
            ))),
        }
    }
}

/// Path helper shared by the step drivers: `<dir>/<stem><suffix>.<ext>`.
pub fn derived_path(dir: &Path, stem: &str, suffix: &str, ext: &str) -> PathBuf {
    dir.join(format!("{stem}{suffix}.{ext}"))
}
