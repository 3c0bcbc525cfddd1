use anyhow::{Result, bail};
use clap::Parser;
use stacks_common::cli::{self, TargetArgs, examples};
use stacks_common::config::{Config, DEFAULT_CONFIG_PATH};
use stacks_common::embed::embed_folder;
use stacks_common::extract::{ExtractOutcome, extract_folder};
use stacks_common::fetch::{FetchOutcome, fetch_for_folder};
use stacks_common::loudness::{LoudnessOutcome, LoudnessTagger};
use stacks_common::resolver::{Policy, Resolver};
use stacks_common::walker::{self, WalkMode};
use stacks_common::{logging, sources};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fetch, embed and export artwork, then write loudness tags",
    long_about = None,
    arg_required_else_help = true,
    after_help = examples("housekeep")
)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Do not download missing artwork
    #[arg(long)]
    skip_fetch: bool,

    /// Do not embed cover.jpg into audio files
    #[arg(long)]
    skip_embed: bool,

    /// Do not export embedded artwork to cover.jpg
    #[arg(long)]
    skip_export: bool,

    /// Do not run the loudness tagger
    #[arg(long)]
    skip_loudness: bool,
}

/// Visit every folder once for one stage, counting the folders that failed.
fn run_stage<F>(name: &str, root: &Path, mode: &WalkMode, mut step: F) -> Result<usize>
where
    F: FnMut(&Path) -> Result<()>,
{
    tracing::info!("Stage: {name}");
    let mut errors = 0;
    for folder in walker::walk(root, mode)? {
        if let Err(e) = step(&folder) {
            tracing::error!("{name} failed for {}: {e:#}", folder.display());
            errors += 1;
        }
    }
    println!("{name}: {errors} error(s)");
    Ok(errors)
}

fn main() -> Result<()> {
    let args: Args = cli::parse_args();
    let config = Config::load(&args.config)?;
    logging::init(Some(&config.paths.logfile))?;

    let root = config.music_root()?;
    let mode = args.target.mode();
    let mut errors = 0;

    if !args.skip_fetch {
        let resolver = Resolver::new(
            sources::from_config(&config)?,
            Policy::from(&config.settings),
        );
        errors += run_stage("Fetch", root, &mode, |folder| {
            let outcome = fetch_for_folder(&resolver, folder)?;
            if let FetchOutcome::Saved { source, resolution } = outcome {
                tracing::debug!("{}: {source} {resolution}", folder.display());
            }
            Ok(())
        })?;
    }

    if !args.skip_embed {
        let temp_res = config.cover_art_script.temp_res;
        errors += run_stage("Embed", root, &mode, |folder| {
            match embed_folder(folder, temp_res)? {
                Some(report) if report.failed > 0 => {
                    bail!("{} file(s) could not be updated", report.failed)
                }
                _ => Ok(()),
            }
        })?;
    }

    if !args.skip_export {
        errors += run_stage("Export", root, &mode, |folder| {
            if let ExtractOutcome::Written(resolution) = extract_folder(folder)? {
                tracing::debug!("{}: exported {resolution}", folder.display());
            }
            Ok(())
        })?;
    }

    if !args.skip_loudness {
        let tagger = LoudnessTagger::from(&config.loudness);
        errors += run_stage("Loudness", root, &mode, |folder| {
            if tagger.tag_folder(folder)? == LoudnessOutcome::NoAudio {
                tracing::debug!("{}: no audio", folder.display());
            }
            Ok(())
        })?;
    }

    if errors > 0 {
        bail!("{errors} folder(s) could not be processed");
    }

    Ok(())
}
