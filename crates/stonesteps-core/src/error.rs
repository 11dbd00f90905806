use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoneStepsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),

    #[error("Invalid FITS file {path}: {reason}")]
    InvalidFits { path: PathBuf, reason: String },

    #[error("No {0} frames available")]
    EmptyInput(String),

    #[error(
        "Frame shape mismatch in {path}: expected {expected_h}x{expected_w}, found {found_h}x{found_w}"
    )]
    ShapeMismatch {
        path: PathBuf,
        expected_h: usize,
        expected_w: usize,
        found_h: usize,
        found_w: usize,
    },

    #[error("Missing header keyword {key} in {path}")]
    MissingMetadata { key: String, path: PathBuf },

    #[error("Invalid header keyword {key} in {path}: {reason}")]
    InvalidMetadata {
        key: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid pixel data in {path}: {reason}")]
    InvalidData { path: PathBuf, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, StoneStepsError>;
