use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use stonesteps_core::pipeline::run_master_bias_reported;

use super::{load_config, CombineMethodArg, SampleFormatArg};
use crate::progress::BarReporter;
use crate::summary::{print_bias_summary, print_result};

#[derive(Args)]
pub struct MasterBiasArgs {
    /// Input bias FITS files
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
}

pub fn run(args: &MasterBiasArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?.master_bias;
    if let Some(method) = args.method {
        config.combine_method = method.into();
    }
    if let Some(ref folder) = args.output_folder {
        config.output_folder = Some(folder.clone());
    }
    if let Some(format) = args.output_format {
        config.output_format = format.into();
    }

    print_bias_summary(&config, &args.files);

    let reporter = BarReporter::new()?;
    let result = run_master_bias_reported(&args.files, &config, &reporter);
    reporter.finish();

    print_result(&result?);
    Ok(())
}
