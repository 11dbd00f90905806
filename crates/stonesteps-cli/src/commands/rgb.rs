use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use stonesteps_core::io::image_io::RasterFormat;
use stonesteps_core::pipeline::run_rgb_reported;

use super::load_config;
use crate::progress::BarReporter;
use crate::summary::{print_result, print_rgb_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum RasterFormatArg {
    Jpeg,
    Png,
}

impl From<RasterFormatArg> for RasterFormat {
    fn from(arg: RasterFormatArg) -> Self {
        match arg {
            RasterFormatArg::Jpeg => Self::Jpeg,
            RasterFormatArg::Png => Self::Png,
        }
    }
}

#[derive(Args)]
pub struct RgbArgs {
    /// Red channel FITS file
    pub red: PathBuf,

    /// Green channel FITS file
    pub green: PathBuf,

    /// Blue channel FITS file
    pub blue: PathBuf,

    /// Lower scaling percentile as a fraction, e.g. 0.05 (overrides config)
    #[arg(long)]
    pub min_percentile: Option<f64>,

    /// Upper scaling percentile as a fraction, e.g. 0.999 (overrides config)
    #[arg(long)]
    pub max_percentile: Option<f64>,

    /// Output directory (default: folder of the red input)
    #[arg(short, long)]
    pub output_folder: Option<PathBuf>,

    /// Raster format (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<RasterFormatArg>,

    /// TrueType font for the labels (overrides config)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Also write the unscaled channels as a FITS cube
    #[arg(long)]
    pub save_cube: bool,
}

pub fn run(args: &RgbArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?.rgb;
    if let Some(p) = args.min_percentile {
        config.min_percentile = p;
    }
    if let Some(p) = args.max_percentile {
        config.max_percentile = p;
    }
    if let Some(ref folder) = args.output_folder {
        config.output_folder = Some(folder.clone());
    }
    if let Some(format) = args.format {
        config.image_format = format.into();
    }
    if let Some(ref font) = args.font {
        config.font_path = font.clone();
    }
    config.save_cube |= args.save_cube;

    let inputs = vec![args.red.clone(), args.green.clone(), args.blue.clone()];
    print_rgb_summary(&config, &inputs);

    let reporter = BarReporter::new()?;
    let result = run_rgb_reported(&inputs, &config, &reporter);
    reporter.finish();

    print_result(&result?);
    Ok(())
}
