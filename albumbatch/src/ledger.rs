use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Processed,
    Failed,
}

/// Append-only record of every album that has been classified.
///
/// Both logs hold one album path per line. An album listed in either one is
/// never handed to the tagging application again.
#[derive(Debug)]
pub struct Ledger {
    processed_log: PathBuf,
    failed_log: PathBuf,
    decided: HashSet<String>,
}

fn read_entries(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(|line| line.trim_end_matches(['\r', '\n']))
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

impl Ledger {
    pub fn open(processed_log: &Path, failed_log: &Path) -> Result<Self> {
        let mut decided = HashSet::new();
        decided.extend(read_entries(processed_log)?);
        decided.extend(read_entries(failed_log)?);

        Ok(Self {
            processed_log: processed_log.to_path_buf(),
            failed_log: failed_log.to_path_buf(),
            decided,
        })
    }

    #[must_use]
    pub fn is_decided(&self, album: &Path) -> bool {
        self.decided.contains(album.to_string_lossy().as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decided.len()
    }

    /// Append `album` to the log for `outcome`. Albums already recorded are
    /// left alone.
    pub fn record(&mut self, album: &Path, outcome: Outcome) -> Result<()> {
        let entry = album.to_string_lossy().into_owned();
        if self.decided.contains(&entry) {
            return Ok(());
        }

        let log = match outcome {
            Outcome::Processed => &self.processed_log,
            Outcome::Failed => &self.failed_log,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log)
            .with_context(|| format!("Failed to open {}", log.display()))?;
        writeln!(file, "{entry}").with_context(|| format!("Failed to write {}", log.display()))?;

        self.decided.insert(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_logs_start_empty() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::open(&dir.path().join("p.txt"), &dir.path().join("f.txt")).unwrap();

        assert_eq!(ledger.len(), 0);
        assert!(!ledger.is_decided(Path::new("/in/Artist/Album")));
    }

    #[test]
    fn existing_entries_from_both_logs_are_decided() {
        let dir = tempdir().unwrap();
        let processed = dir.path().join("p.txt");
        let failed = dir.path().join("f.txt");
        fs::write(&processed, "/in/A/One\n\n").unwrap();
        fs::write(&failed, "/in/B/Two\n").unwrap();

        let ledger = Ledger::open(&processed, &failed).unwrap();

        assert_eq!(ledger.len(), 2);
        assert!(ledger.is_decided(Path::new("/in/A/One")));
        assert!(ledger.is_decided(Path::new("/in/B/Two")));
    }

    #[test]
    fn trailing_whitespace_in_paths_survives_reload() {
        let dir = tempdir().unwrap();
        let processed = dir.path().join("p.txt");
        let failed = dir.path().join("f.txt");
        let album = Path::new("/in/A/Live ");
        fs::write(&failed, "/in/B/Two\r\n").unwrap();

        let mut ledger = Ledger::open(&processed, &failed).unwrap();
        ledger.record(album, Outcome::Processed).unwrap();

        let reopened = Ledger::open(&processed, &failed).unwrap();
        assert!(reopened.is_decided(album));
        assert!(!reopened.is_decided(Path::new("/in/A/Live")));
        assert!(reopened.is_decided(Path::new("/in/B/Two")));
    }

    #[test]
    fn record_appends_exactly_once() {
        let dir = tempdir().unwrap();
        let processed = dir.path().join("p.txt");
        let failed = dir.path().join("f.txt");
        let album = Path::new("/in/A/One");

        let mut ledger = Ledger::open(&processed, &failed).unwrap();
        ledger.record(album, Outcome::Processed).unwrap();
        ledger.record(album, Outcome::Processed).unwrap();
        ledger.record(album, Outcome::Failed).unwrap();

        assert_eq!(fs::read_to_string(&processed).unwrap(), "/in/A/One\n");
        assert!(!failed.exists());

        let reopened = Ledger::open(&processed, &failed).unwrap();
        assert!(reopened.is_decided(album));
    }
}
