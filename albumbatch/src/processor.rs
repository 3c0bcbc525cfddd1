use crate::ledger::{Ledger, Outcome};
use crate::tagger::TaggerApp;
use anyhow::{Context, Result, bail};
use stacks_common::config::BatchConfig;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl PassStats {
    #[must_use]
    pub fn classified(&self) -> usize {
        self.processed + self.failed
    }
}

/// Artist directory together with the album directories below it.
struct ArtistAlbums {
    artist: PathBuf,
    albums: Vec<PathBuf>,
}

/// Hands every `<artist>/<album>` folder of the input root to the tagging
/// application and files it under the output or failure root.
pub struct BatchProcessor<T: TaggerApp> {
    tagger: T,
    ledger: Ledger,
    input_root: PathBuf,
    output_root: PathBuf,
    failure_root: PathBuf,
    max_passes: u32,
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    let mut entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    Ok(entries.next().is_none())
}

/// Move `album` into `dest_root/<artist>/`.
fn move_album(album: &Path, dest_root: &Path) -> Result<PathBuf> {
    let (Some(album_name), Some(artist_name)) = (
        album.file_name(),
        album.parent().and_then(Path::file_name),
    ) else {
        bail!("{} is not an artist/album path", album.display());
    };

    let dest_artist = dest_root.join(artist_name);
    fs::create_dir_all(&dest_artist)
        .with_context(|| format!("Failed to create {}", dest_artist.display()))?;

    let dest = dest_artist.join(album_name);
    if dest.exists() {
        bail!("{} already exists", dest.display());
    }
    fs::rename(album, &dest).with_context(|| {
        format!("Failed to move {} to {}", album.display(), dest.display())
    })?;

    Ok(dest)
}

impl<T: TaggerApp> BatchProcessor<T> {
    pub fn new(tagger: T, ledger: Ledger, config: &BatchConfig) -> Self {
        Self {
            tagger,
            ledger,
            input_root: config.input_root.clone(),
            output_root: config.output_root.clone(),
            failure_root: config.failure_root.clone(),
            max_passes: config.max_passes,
        }
    }

    fn collect_albums(&self) -> Result<Vec<ArtistAlbums>> {
        if !self.input_root.is_dir() {
            bail!("{} is not a valid directory", self.input_root.display());
        }

        let mut artists: Vec<ArtistAlbums> = Vec::new();
        for entry in WalkDir::new(&self.input_root)
            .min_depth(1)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            if entry.depth() == 1 {
                artists.push(ArtistAlbums {
                    artist: entry.into_path(),
                    albums: Vec::new(),
                });
            } else if let Some(current) = artists.last_mut() {
                current.albums.push(entry.into_path());
            }
        }

        Ok(artists)
    }

    fn process_album(&mut self, album: &Path) -> Result<Outcome> {
        tracing::info!("Tagging {}", album.display());
        let outcome = match self.tagger.tag_album(album) {
            Ok(()) => Outcome::Processed,
            Err(e) => {
                tracing::error!("Tagging failed for {}: {e:#}", album.display());
                Outcome::Failed
            }
        };

        let dest_root = match outcome {
            Outcome::Processed => &self.output_root,
            Outcome::Failed => &self.failure_root,
        };
        match move_album(album, dest_root) {
            Ok(dest) => tracing::info!("Moved to {}", dest.display()),
            Err(e) => tracing::error!("{e:#}"),
        }

        self.ledger.record(album, outcome)?;
        Ok(outcome)
    }

    /// One sweep over the input root.
    pub fn run_pass(&mut self) -> Result<PassStats> {
        if let Err(e) = self.tagger.ensure_running() {
            tracing::warn!("Could not make sure the tagging application is running: {e:#}");
        }

        let mut stats = PassStats::default();
        for ArtistAlbums { artist, albums } in self.collect_albums()? {
            for album in albums {
                if self.ledger.is_decided(&album) {
                    stats.skipped += 1;
                    continue;
                }
                match is_empty_dir(&album) {
                    Ok(true) => {
                        tracing::debug!("Skipping empty album {}", album.display());
                        stats.skipped += 1;
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!("{e:#}");
                        stats.skipped += 1;
                        continue;
                    }
                }

                match self.process_album(&album)? {
                    Outcome::Processed => stats.processed += 1,
                    Outcome::Failed => stats.failed += 1,
                }
            }

            if matches!(is_empty_dir(&artist), Ok(true)) {
                match fs::remove_dir(&artist) {
                    Ok(()) => tracing::debug!("Removed empty {}", artist.display()),
                    Err(e) => tracing::warn!("Failed to remove {}: {e}", artist.display()),
                }
            }
        }

        Ok(stats)
    }

    /// Repeat passes until one classifies nothing, or until `max_passes`
    /// when that is non-zero. Returns the number of passes run.
    pub fn run(&mut self) -> Result<u32> {
        let mut passes = 0;
        loop {
            passes += 1;
            let stats = self.run_pass()?;
            tracing::info!(
                "Pass {passes}: {} processed, {} failed, {} skipped",
                stats.processed,
                stats.failed,
                stats.skipped
            );

            if stats.classified() == 0 {
                break;
            }
            if self.max_passes > 0 && passes >= self.max_passes {
                tracing::info!("Stopping after {passes} pass(es)");
                break;
            }
        }
        Ok(passes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::{TempDir, tempdir};

    #[derive(Clone)]
    struct FakeTagger {
        succeed: bool,
        start_fails: bool,
        calls: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl FakeTagger {
        fn new(succeed: bool) -> Self {
            Self {
                succeed,
                start_fails: false,
                calls: Rc::default(),
            }
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.borrow().clone()
        }
    }

    impl TaggerApp for FakeTagger {
        fn ensure_running(&mut self) -> Result<()> {
            if self.start_fails {
                bail!("pgrep not found");
            }
            Ok(())
        }

        fn tag_album(&mut self, album: &Path) -> Result<()> {
            self.calls.borrow_mut().push(album.to_path_buf());
            if self.succeed {
                Ok(())
            } else {
                bail!("tagger crashed")
            }
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: BatchConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let root = dir.path();
            fs::create_dir_all(root.join("in")).unwrap();
            let config = BatchConfig {
                input_root: root.join("in"),
                output_root: root.join("out"),
                failure_root: root.join("failed"),
                processed_log: root.join("processed_albums.txt"),
                failed_log: root.join("failed_albums.txt"),
                commands_file: root.join("commands.txt"),
                program: "picard".into(),
                args: Vec::new(),
                start_args: Vec::new(),
                process_name: "picard".into(),
                startup_delay_secs: 0,
                max_passes: 0,
            };
            Self { _dir: dir, config }
        }

        fn album(&self, artist: &str, album: &str) -> PathBuf {
            let path = self.config.input_root.join(artist).join(album);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join("01 Track.mp3"), b"audio").unwrap();
            path
        }

        fn processor(&self, tagger: FakeTagger) -> BatchProcessor<FakeTagger> {
            let ledger =
                Ledger::open(&self.config.processed_log, &self.config.failed_log).unwrap();
            BatchProcessor::new(tagger, ledger, &self.config)
        }

        fn log(&self, path: &Path) -> String {
            fs::read_to_string(path).unwrap_or_default()
        }
    }

    #[test]
    fn successful_album_moves_to_output_root() {
        let fx = Fixture::new();
        let album = fx.album("Artist", "Album");
        let tagger = FakeTagger::new(true);

        let passes = fx.processor(tagger.clone()).run().unwrap();

        assert_eq!(passes, 2);
        assert_eq!(tagger.calls(), [album.clone()]);
        assert!(!album.exists());
        assert!(fx.config.output_root.join("Artist/Album/01 Track.mp3").exists());
        assert_eq!(
            fx.log(&fx.config.processed_log),
            format!("{}\n", album.display())
        );
        assert!(fx.log(&fx.config.failed_log).is_empty());
        assert!(!fx.config.input_root.join("Artist").exists());
    }

    #[test]
    fn failed_album_moves_to_failure_root() {
        let fx = Fixture::new();
        let album = fx.album("Artist", "Album");
        let tagger = FakeTagger::new(false);
        let mut processor = fx.processor(tagger.clone());

        let first = processor.run_pass().unwrap();
        let second = processor.run_pass().unwrap();

        assert_eq!(first.failed, 1);
        assert_eq!(second, PassStats::default());
        assert_eq!(tagger.calls().len(), 1);
        assert!(fx.config.failure_root.join("Artist/Album").is_dir());
        assert_eq!(
            fx.log(&fx.config.failed_log),
            format!("{}\n", album.display())
        );
        assert!(fx.log(&fx.config.processed_log).is_empty());
    }

    #[test]
    fn albums_in_the_ledger_are_never_retagged() {
        let fx = Fixture::new();
        let album = fx.album("Artist", "Album");
        fs::write(&fx.config.processed_log, format!("{}\n", album.display())).unwrap();
        let tagger = FakeTagger::new(true);

        let stats = fx.processor(tagger.clone()).run_pass().unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.classified(), 0);
        assert!(tagger.calls().is_empty());
        assert!(album.is_dir());
    }

    #[test]
    fn failed_move_is_still_recorded() {
        let fx = Fixture::new();
        let album = fx.album("Artist", "Album");
        fs::write(&fx.config.output_root, b"not a directory").unwrap();
        let tagger = FakeTagger::new(true);
        let mut processor = fx.processor(tagger.clone());

        processor.run_pass().unwrap();
        processor.run_pass().unwrap();

        assert!(album.is_dir());
        assert_eq!(tagger.calls().len(), 1);
        assert_eq!(
            fx.log(&fx.config.processed_log),
            format!("{}\n", album.display())
        );
    }

    #[test]
    fn empty_albums_are_left_unclassified() {
        let fx = Fixture::new();
        let empty = fx.config.input_root.join("Artist/Empty");
        fs::create_dir_all(&empty).unwrap();
        let tagger = FakeTagger::new(true);

        let stats = fx.processor(tagger.clone()).run_pass().unwrap();

        assert_eq!(stats.skipped, 1);
        assert!(tagger.calls().is_empty());
        assert!(empty.is_dir());
        assert!(fx.log(&fx.config.processed_log).is_empty());
    }

    #[test]
    fn several_artists_in_one_pass() {
        let fx = Fixture::new();
        fx.album("A", "One");
        fx.album("A", "Two");
        fx.album("B", "Three");
        let tagger = FakeTagger::new(true);

        let stats = fx.processor(tagger.clone()).run_pass().unwrap();

        assert_eq!(stats.processed, 3);
        assert_eq!(tagger.calls().len(), 3);
        assert!(fx.config.output_root.join("A/One").is_dir());
        assert!(fx.config.output_root.join("A/Two").is_dir());
        assert!(fx.config.output_root.join("B/Three").is_dir());
        assert_eq!(fx.log(&fx.config.processed_log).lines().count(), 3);
    }

    #[test]
    fn max_passes_caps_the_loop() {
        let mut fx = Fixture::new();
        fx.config.max_passes = 1;
        fx.album("Artist", "Album");

        let passes = fx.processor(FakeTagger::new(true)).run().unwrap();

        assert_eq!(passes, 1);
    }

    #[test]
    fn failed_liveness_check_does_not_stop_the_pass() {
        let fx = Fixture::new();
        fx.album("Artist", "Album");
        let tagger = FakeTagger {
            start_fails: true,
            ..FakeTagger::new(true)
        };

        let stats = fx.processor(tagger.clone()).run_pass().unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(tagger.calls().len(), 1);
    }

    #[test]
    fn missing_input_root_is_an_error() {
        let fx = Fixture::new();
        fs::remove_dir(&fx.config.input_root).unwrap();

        assert!(fx.processor(FakeTagger::new(true)).run_pass().is_err());
    }
}
