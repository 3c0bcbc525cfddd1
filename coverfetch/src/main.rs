use anyhow::{Result, bail};
use clap::Parser;
use stacks_common::cli::{self, TargetArgs, examples};
use stacks_common::config::{Config, DEFAULT_CONFIG_PATH};
use stacks_common::fetch::{FetchOutcome, fetch_for_folder};
use stacks_common::resolver::{Policy, Resolver};
use stacks_common::{logging, sources, walker};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fetch album artwork from iTunes, MusicBrainz and Last.fm into cover.jpg",
    long_about = None,
    arg_required_else_help = true,
    after_help = examples("coverfetch")
)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Default)]
struct Stats {
    saved: usize,
    present: usize,
    not_found: usize,
    no_audio: usize,
    errors: usize,
}

fn main() -> Result<()> {
    let args: Args = cli::parse_args();
    let config = Config::load(&args.config)?;
    logging::init(Some(&config.paths.logfile))?;

    let folders = walker::walk(config.music_root()?, &args.target.mode())?;
    let resolver = Resolver::new(sources::from_config(&config)?, Policy::from(&config.settings));

    let mut stats = Stats::default();
    for folder in folders {
        match fetch_for_folder(&resolver, &folder) {
            Ok(FetchOutcome::Saved { .. }) => stats.saved += 1,
            Ok(FetchOutcome::AlreadyPresent) => stats.present += 1,
            Ok(FetchOutcome::NotFound) => stats.not_found += 1,
            Ok(FetchOutcome::NoAudio) => stats.no_audio += 1,
            Err(e) => {
                tracing::error!("Failed to fetch artwork for {}: {e:#}", folder.display());
                stats.errors += 1;
            }
        }
    }

    println!("\nSaved: {}", stats.saved);
    println!("Already present: {}", stats.present);
    println!("Not found: {}", stats.not_found);
    if stats.no_audio > 0 {
        println!("Without audio: {}", stats.no_audio);
    }
    if stats.errors > 0 {
        println!("Errors: {}", stats.errors);
        bail!("{} folder(s) could not be processed", stats.errors);
    }

    Ok(())
}
