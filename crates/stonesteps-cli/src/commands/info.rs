use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stonesteps_core::consts::{KEY_EXPTIME, KEY_FILTER, KEY_OBSERVATORY, KEY_OBSERVER};
use stonesteps_core::io::fits::read_fits;
use stonesteps_core::normalize::masked_median;

#[derive(Args)]
pub struct InfoArgs {
    /// Input FITS files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print every header card
    #[arg(long)]
    pub all: bool,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    for (i, file) in args.files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let frame =
            read_fits(file).with_context(|| format!("Failed to read {}", file.display()))?;

        println!("File:        {}", file.display());
        println!("Dimensions:  {}x{}", frame.width(), frame.height());
        println!(
            "Format:      {} (BITPIX {})",
            frame.source_format,
            frame.source_format.bitpix()
        );

        for (label, key) in [
            ("Exposure:", KEY_EXPTIME),
            ("Filter:", KEY_FILTER),
            ("Observer:", KEY_OBSERVER),
            ("Observatory:", KEY_OBSERVATORY),
        ] {
            if let Some(value) = frame.header.get(key) {
                println!("{:<13}{}", label, value);
            }
        }

        if let Some(median) = masked_median(frame.data.view()) {
            println!("Median:      {:.2}", median);
        }

        if args.all {
            println!("Header:");
            for card in frame.header.cards() {
                match &card.comment {
                    Some(c) => println!("  {:<8} = {} / {}", card.keyword, card.value, c),
                    None => println!("  {:<8} = {}", card.keyword, card.value),
                }
            }
            for line in frame.header.history() {
                println!("  HISTORY  {}", line);
            }
        }
    }
    Ok(())
}
