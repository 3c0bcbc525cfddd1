use anyhow::{Result, bail};
use clap::Parser;
use stacks_common::cli::{self, TargetArgs, examples};
use stacks_common::config::{Config, DEFAULT_CONFIG_PATH};
use stacks_common::embed::embed_folder;
use stacks_common::{logging, walker};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Embed cover.jpg into audio files, never replacing larger artwork",
    long_about = None,
    arg_required_else_help = true,
    after_help = examples("coverembed")
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

    let temp_res = config.cover_art_script.temp_res;
    let folders = walker::walk(config.music_root()?, &args.target.mode())?;

    let mut embedded = 0;
    let mut kept = 0;
    let mut skipped = 0;
    let mut errors = 0;

    for folder in folders {
        match embed_folder(&folder, temp_res) {
            Ok(Some(report)) => {
                embedded += report.embedded;
                kept += report.kept;
                errors += report.failed;
            }
            Ok(None) => skipped += 1,
            Err(e) => {
                tracing::error!("Failed to embed artwork in {}: {e:#}", folder.display());
                errors += 1;
            }
        }
    }

    println!("\nEmbedded: {embedded}");
    println!("Kept existing: {kept}");
    println!("Folders without cover: {skipped}");
    if errors > 0 {
        println!("Errors: {errors}");
        bail!("{errors} item(s) could not be processed");
    }

    Ok(())
}
