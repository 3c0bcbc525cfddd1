use anyhow::{Result, bail};
use clap::Parser;
use stacks_common::cli::{self, TargetArgs, examples};
use stacks_common::config::{Config, DEFAULT_CONFIG_PATH};
use stacks_common::loudness::{LoudnessOutcome, LoudnessTagger};
use stacks_common::{logging, walker};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Write album and track loudness tags with an external gain utility",
    long_about = None,
    arg_required_else_help = true,
    after_help = examples("loudtag")
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

    let tagger = LoudnessTagger::from(&config.loudness);
    let folders = walker::walk(config.music_root()?, &args.target.mode())?;

    let mut tagged = 0;
    let mut errors = 0;

    for folder in folders {
        match tagger.tag_folder(&folder) {
            Ok(LoudnessOutcome::Tagged) => tagged += 1,
            Ok(LoudnessOutcome::NoAudio) => {}
            Err(e) => {
                tracing::error!("Loudness tagging failed for {}: {e:#}", folder.display());
                errors += 1;
            }
        }
    }

    println!("\nTagged folders: {tagged}");
    if errors > 0 {
        println!("Errors: {errors}");
        bail!("{errors} folder(s) could not be tagged");
    }

    Ok(())
}
