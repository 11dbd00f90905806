use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use stonesteps_core::pipeline::run_master_flat_reported;

use super::{load_config, CombineMethodArg, SampleFormatArg};
use crate::progress::BarReporter;
use crate::summary::{print_flat_summary, print_result};

#[derive(Args)]
pub struct MasterFlatArgs {
    /// Input flat FITS files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Combination method (overrides config)
    #[arg(long, value_enum)]
    pub method: Option<CombineMethodArg>,

    /// Output directory (default: folder of the first input)
    #[arg(short, long)]
    pub output_folder: Option<PathBuf>,

    /// Output sample format (overrides config)
    #[arg(long, value_enum)]
    pub output_format: Option<SampleFormatArg>,

    /// Master bias file glob pattern
    #[arg(long)]
    pub bias: Option<String>,

    /// Master dark file glob pattern
    #[arg(long)]
    pub dark: Option<String>,

    /// Comma-separated header keywords the bias and dark must share with the flats
    #[arg(long, value_delimiter = ',')]
    pub fit_keys: Option<Vec<String>>,
}

pub fn run(args: &MasterFlatArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?.master_flat;
    if let Some(method) = args.method {
        config.combine_method = method.into();
    }
    if let Some(ref folder) = args.output_folder {
        config.output_folder = Some(folder.clone());
    }
    if let Some(format) = args.output_format {
        config.output_format = format.into();
    }
    if let Some(ref pattern) = args.bias {
        config.bias.pattern = pattern.clone();
    }
    if let Some(ref pattern) = args.dark {
        config.dark.pattern = pattern.clone();
    }
    if let Some(ref keys) = args.fit_keys {
        let keys: Vec<String> = keys.iter().map(|k| k.trim().to_ascii_uppercase()).collect();
        config.bias.fit_keys = keys.clone();
        config.dark.fit_keys = keys;
    }

    print_flat_summary(&config, &args.files);

    let reporter = BarReporter::new()?;
    let result = run_master_flat_reported(&args.files, &config, &reporter);
    reporter.finish();

    print_result(&result?);
    Ok(())
}
