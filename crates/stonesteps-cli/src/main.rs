mod commands;
mod progress;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stonesteps", about = "Calibration-frame and RGB composite pipeline steps")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Step configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show FITS header and image metadata
    Info(commands::info::InfoArgs),
    /// Combine bias frames into a master bias
    MasterBias(commands::master_bias::MasterBiasArgs),
    /// Calibrate, normalize and combine flats into a master flat
    MasterFlat(commands::master_flat::MasterFlatArgs),
    /// Build an annotated RGB composite from three filter exposures
    Rgb(commands::rgb::RgbArgs),
    /// Print the default step configuration as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::MasterBias(args) => commands::master_bias::run(args, config),
        Commands::MasterFlat(args) => commands::master_flat::run(args, config),
        Commands::Rgb(args) => commands::rgb::run(args, config),
        Commands::Config(args) => commands::config::run(args),
    }
}
