use crate::config::LoudnessConfig;
use crate::walker;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoudnessOutcome {
    Tagged,
    NoAudio,
}

/// Writes album and track gain tags through an external utility.
#[derive(Debug, Clone)]
pub struct LoudnessTagger {
    program: String,
    album_args: Vec<String>,
    track_args: Vec<String>,
    extensions: Vec<String>,
}

impl From<&LoudnessConfig> for LoudnessTagger {
    fn from(config: &LoudnessConfig) -> Self {
        Self {
            program: config.program.clone(),
            album_args: config.album_args.clone(),
            track_args: config.track_args.clone(),
            extensions: config.extensions.clone(),
        }
    }
}

impl LoudnessTagger {
    fn handles(&self, file: &Path) -> bool {
        file.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
    }

    /// Run the album-gain pass, then the track-gain pass, over the audio
    /// files directly inside `folder` that the utility handles.
    pub fn tag_folder(&self, folder: &Path) -> Result<LoudnessOutcome> {
        let files: Vec<PathBuf> = walker::audio_files(folder)?
            .into_iter()
            .filter(|file| self.handles(file))
            .collect();
        if files.is_empty() {
            return Ok(LoudnessOutcome::NoAudio);
        }

        tracing::info!("Tagging loudness for {} files in {}", files.len(), folder.display());
        self.run(&self.album_args, &files)
            .context("Album gain pass failed")?;
        self.run(&self.track_args, &files)
            .context("Track gain pass failed")?;

        Ok(LoudnessOutcome::Tagged)
    }

    fn run(&self, args: &[String], files: &[PathBuf]) -> Result<()> {
        let status = Command::new(&self.program)
            .args(args)
            .args(files)
            .status()
            .with_context(|| format!("Failed to execute {}", self.program))?;

        if !status.success() {
            bail!("{} failed with status: {status}", self.program);
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    fn tagger(program: &str, album_args: &[&str], track_args: &[&str]) -> LoudnessTagger {
        LoudnessTagger::from(&LoudnessConfig {
            program: program.into(),
            album_args: album_args.iter().map(|s| (*s).to_string()).collect(),
            track_args: track_args.iter().map(|s| (*s).to_string()).collect(),
            ..LoudnessConfig::default()
        })
    }

    #[test]
    fn both_passes_run_with_all_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("01.mp3"), b"").unwrap();
        fs::write(dir.path().join("02.mp3"), b"").unwrap();
        let log = dir.path().join("calls.log");
        let script = format!("echo \"$0 $#\" >> '{}'", log.display());

        let outcome = tagger("sh", &["-c", &script, "album"], &["-c", &script, "track"])
            .tag_folder(dir.path())
            .unwrap();

        assert_eq!(outcome, LoudnessOutcome::Tagged);
        let calls = fs::read_to_string(&log).unwrap();
        assert_eq!(calls.lines().collect::<Vec<_>>(), vec!["album 2", "track 2"]);
    }

    #[test]
    fn failing_utility_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("01.mp3"), b"").unwrap();

        assert!(tagger("false", &[], &[]).tag_folder(dir.path()).is_err());
    }

    #[test]
    fn missing_utility_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("01.mp3"), b"").unwrap();

        let result = tagger("definitely-not-a-gain-utility", &[], &[]).tag_folder(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn only_handled_extensions_are_passed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("01.MP3"), b"").unwrap();
        fs::write(dir.path().join("02.flac"), b"").unwrap();
        let log = dir.path().join("calls.log");
        let script = format!("echo \"$0 $#\" >> '{}'", log.display());

        tagger("sh", &["-c", &script, "album"], &["-c", &script, "track"])
            .tag_folder(dir.path())
            .unwrap();

        let calls = fs::read_to_string(&log).unwrap();
        assert_eq!(calls.lines().collect::<Vec<_>>(), vec!["album 1", "track 1"]);
    }

    #[test]
    fn flac_only_folder_is_skipped_by_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("01.flac"), b"").unwrap();
        fs::write(dir.path().join("02.ogg"), b"").unwrap();

        let outcome = tagger("false", &[], &[]).tag_folder(dir.path()).unwrap();
        assert_eq!(outcome, LoudnessOutcome::NoAudio);
    }

    #[test]
    fn folder_without_audio_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let outcome = tagger("false", &[], &[]).tag_folder(dir.path()).unwrap();
        assert_eq!(outcome, LoudnessOutcome::NoAudio);
    }
}
