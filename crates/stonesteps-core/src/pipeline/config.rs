use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FONT_PATH;
use crate::error::{Result, StoneStepsError};
use crate::frame::SampleFormat;
use crate::io::image_io::RasterFormat;
use crate::rgb::PercentileRange;
use crate::stack::CombineMethod;

/// Configuration for every step. Each section is optional in TOML.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepsConfig {
    pub master_bias: MasterBiasConfig,
    pub master_flat: MasterFlatConfig,
    pub rgb: RgbConfig,
}

impl StepsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.master_bias.validate()?;
        self.master_flat.validate()?;
        self.rgb.validate()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterBiasConfig {
    pub combine_method: CombineMethod,
    /// Destination directory; the first input's directory when unset.
    pub output_folder: Option<PathBuf>,
    pub output_format: SampleFormat,
}

impl MasterBiasConfig {
    pub fn validate(&self) -> Result<()> {
        validate_output_folder(self.output_folder.as_deref())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterFlatConfig {
    pub combine_method: CombineMethod,
    /// Destination directory; the first input's directory when unset.
    pub output_folder: Option<PathBuf>,
    pub output_format: SampleFormat,
    /// How to find the master bias matching the flats.
    pub bias: AuxFileConfig,
    /// How to find the master dark matching the flats.
    pub dark: AuxFileConfig,
}

impl Default for MasterFlatConfig {
    fn default() -> Self {
        Self {
            combine_method: CombineMethod::Median,
            output_folder: None,
            output_format: SampleFormat::F32,
            bias: AuxFileConfig::with_pattern("*_MBIAS.fits"),
            dark: AuxFileConfig::with_pattern("*_MDARK.fits"),
        }
    }
}

impl MasterFlatConfig {
    pub fn validate(&self) -> Result<()> {
        validate_output_folder(self.output_folder.as_deref())?;
        self.bias.validate("bias")?;
        self.dark.validate("dark")
    }
}

/// Locates an auxiliary calibration file.
///
/// `pattern` is a glob pattern. `$VAR`, `${VAR}` and a leading `~` are
/// expanded first (unset variables stay as written); a relative pattern is
/// resolved against the directory of the first input file. Among the
/// matching files, the first (by path) whose `fit_keys` header values equal
/// the input's is used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuxFileConfig {
    pub pattern: String,
    pub fit_keys: Vec<String>,
}

impl Default for AuxFileConfig {
    fn default() -> Self {
        Self::with_pattern("*.fits")
    }
}

impl AuxFileConfig {
    pub fn with_pattern(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            fit_keys: vec!["INSTRUME".into(), "XBINNING".into(), "YBINNING".into()],
        }
    }

    pub fn validate(&self, kind: &str) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(StoneStepsError::InvalidConfig(format!(
                "{kind} file pattern is empty"
            )));
        }
        if let Some(key) = self.fit_keys.iter().find(|k| k.is_empty() || k.len() > 8) {
            return Err(StoneStepsError::InvalidConfig(format!(
                "{kind} fit key '{key}' is not a valid header keyword"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RgbConfig {
    /// Fraction of each channel's pixels below the channel's black point.
    pub min_percentile: f64,
    /// Fraction of all pixels below the shared white point.
    pub max_percentile: f64,
    /// Destination directory; the first input's directory when unset.
    pub output_folder: Option<PathBuf>,
    pub image_format: RasterFormat,
    /// TrueType font for labels. Labels are skipped if it cannot be loaded.
    pub font_path: PathBuf,
    /// Also write the unscaled channels as a 3-plane FITS cube.
    pub save_cube: bool,
}

impl Default for RgbConfig {
    fn default() -> Self {
        let range = PercentileRange::default();
        Self {
            min_percentile: range.min,
            max_percentile: range.max,
            output_folder: None,
            image_format: RasterFormat::Jpeg,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            save_cube: false,
        }
    }
}

impl RgbConfig {
    pub fn percentiles(&self) -> PercentileRange {
        PercentileRange {
            min: self.min_percentile,
            max: self.max_percentile,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_output_folder(self.output_folder.as_deref())?;
        self.percentiles().validate()
    }
}

fn validate_output_folder(folder: Option<&Path>) -> Result<()> {
    match folder {
        Some(f) if f.as_os_str().is_empty() => Err(StoneStepsError::InvalidConfig(
            "output_folder is empty; omit it to write next to the inputs".into(),
        )),
        _ => Ok(()),
    }
}
