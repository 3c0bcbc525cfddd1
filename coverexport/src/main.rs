use anyhow::{Result, bail};
use clap::Parser;
use stacks_common::cli::{self, TargetArgs, examples};
use stacks_common::config::{Config, DEFAULT_CONFIG_PATH};
use stacks_common::extract::{ExtractOutcome, extract_folder};
use stacks_common::{logging, walker};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Export embedded cover art to cover.jpg",
    long_about = None,
    arg_required_else_help = true,
    after_help = examples("coverexport")
)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> Result<()> {
    let args: Args = cli::parse_args();
    let config = Config::load(&args.config)?;
    logging::init(Some(&config.paths.logfile))?;

    let folders = walker::walk(config.music_root()?, &args.target.mode())?;

    let mut exported = 0;
    let mut skipped = 0;
    let mut errors = 0;

    for folder in folders {
        match extract_folder(&folder) {
            Ok(ExtractOutcome::Written(_)) => exported += 1,
            Ok(
                ExtractOutcome::AlreadyPresent
                | ExtractOutcome::NoAudio
                | ExtractOutcome::NoArtwork,
            ) => skipped += 1,
            Err(e) => {
                tracing::error!("Could not export cover art in {}: {e:#}", folder.display());
                errors += 1;
            }
        }
    }

    println!("\nExported: {exported}");
    println!("Skipped: {skipped}");
    if errors > 0 {
        println!("Errors: {errors}");
        bail!("{errors} folder(s) could not be processed");
    }

    Ok(())
}
