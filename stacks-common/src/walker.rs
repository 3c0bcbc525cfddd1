use anyhow::{Context, Result, bail};
use regex::Regex;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static DISC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(cd|disc|disk)\s*\d+$").expect("valid disc regex"));

const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "flac", "ogg", "m4a"];

/// Which folders of the library a run should visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkMode {
    /// Only the given folder.
    Single(PathBuf),
    /// Every album folder (and everything below it) under the root.
    Library,
    /// Only disc folders such as `CD 1` or `Disc 2`.
    Discs,
}

/// Enumerate candidate folders under `root`.
///
/// Returns an error up front if the root (or the single folder) is missing or
/// unreadable. Entries that fail during iteration are logged and skipped.
pub fn walk(root: &Path, mode: &WalkMode) -> Result<Box<dyn Iterator<Item = PathBuf>>> {
    if let WalkMode::Single(folder) = mode {
        if !folder.is_dir() {
            bail!("{} is not a valid directory", folder.display());
        }
        return Ok(Box::new(std::iter::once(folder.clone())));
    }

    if !root.is_dir() {
        bail!("{} is not a valid directory", root.display());
    }
    fs::read_dir(root).with_context(|| format!("Could not read {}", root.display()))?;

    let discs_only = *mode == WalkMode::Discs;
    let folders = WalkDir::new(root)
        .min_depth(2)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter(move |entry| !discs_only || is_disc_dir(entry.file_name()))
        .map(walkdir::DirEntry::into_path);

    Ok(Box::new(folders))
}

#[must_use]
pub fn is_disc_dir(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|name| DISC_NAME.is_match(name.trim()))
}

#[must_use]
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Audio files directly inside `dir`, sorted by name.
pub fn audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_audio_file(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
