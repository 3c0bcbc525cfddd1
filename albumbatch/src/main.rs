mod ledger;
mod processor;
mod tagger;

use anyhow::{Context, Result};
use clap::Parser;
use ledger::Ledger;
use processor::BatchProcessor;
use stacks_common::config::{Config, DEFAULT_CONFIG_PATH};
use stacks_common::logging;
use std::path::PathBuf;
use tagger::ExternalTagger;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Tag incoming albums and sort them into processed and failed trees",
    long_about = None
)]
struct Args {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many passes (0 runs until a pass finds nothing new)
    #[arg(long, value_name = "N")]
    max_passes: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    logging::init(Some(&config.paths.logfile))?;

    let mut batch = config.batch()?.clone();
    batch.input_root = batch
        .input_root
        .canonicalize()
        .with_context(|| format!("Input root not found: {}", batch.input_root.display()))?;
    if let Some(max_passes) = args.max_passes {
        batch.max_passes = max_passes;
    }

    let ledger = Ledger::open(&batch.processed_log, &batch.failed_log)?;
    tracing::info!("{} album(s) already classified", ledger.len());

    let mut processor = BatchProcessor::new(ExternalTagger::from(&batch), ledger, &batch);
    let passes = processor.run()?;

    println!("\nFinished after {passes} pass(es)");
    Ok(())
}
