use crate::sources::SourceKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "artwork-config.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub settings: ArtworkSettings,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub musicbrainz: MusicBrainzConfig,
    #[serde(default)]
    pub cover_art_script: CoverArtConfig,
    #[serde(default)]
    pub loudness: LoudnessConfig,
    pub batch: Option<BatchConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PathsConfig {
    /// Required by the library tools, unused by the batch processor.
    pub rootmusicdir: Option<PathBuf>,
    #[serde(default = "default_logfile")]
    pub logfile: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            rootmusicdir: None,
            logfile: default_logfile(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ArtworkSettings {
    #[serde(rename = "USE_HIRES")]
    pub use_hires: bool,
    #[serde(rename = "MIN_RES")]
    pub min_res: u32,
    #[serde(rename = "USE_FALLBACK")]
    pub use_fallback: bool,
    #[serde(rename = "USE_HIRES_PRIORITY")]
    pub use_hires_priority: bool,
    #[serde(rename = "USE_MUSICBRAINZ")]
    pub use_musicbrainz: bool,
    #[serde(rename = "NO_LOW_RES")]
    pub no_low_res: bool,
    #[serde(rename = "SOURCES")]
    pub sources: Vec<SourceKind>,
    pub http_timeout_secs: u64,
}

impl Default for ArtworkSettings {
    fn default() -> Self {
        Self {
            use_hires: false,
            min_res: 500,
            use_fallback: true,
            use_hires_priority: false,
            use_musicbrainz: true,
            no_low_res: false,
            sources: vec![SourceKind::MusicBrainz, SourceKind::ITunes, SourceKind::LastFm],
            http_timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Credentials {
    #[serde(rename = "lastfm-apikey")]
    pub lastfm_apikey: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MusicBrainzConfig {
    #[serde(default)]
    pub useragent_email: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CoverArtConfig {
    #[serde(rename = "TEMP_RES", default = "default_temp_res")]
    pub temp_res: u32,
}

impl Default for CoverArtConfig {
    fn default() -> Self {
        Self {
            temp_res: default_temp_res(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoudnessConfig {
    pub program: String,
    pub album_args: Vec<String>,
    pub track_args: Vec<String>,
    /// File extensions the utility understands; other audio files are left out.
    pub extensions: Vec<String>,
}

impl Default for LoudnessConfig {
    fn default() -> Self {
        Self {
            program: "mp3gain".into(),
            album_args: vec!["-a".into(), "-s".into(), "i".into()],
            track_args: vec!["-r".into(), "-s".into(), "i".into()],
            extensions: vec!["mp3".into()],
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct BatchConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub failure_root: PathBuf,
    #[serde(default = "default_processed_log")]
    pub processed_log: PathBuf,
    #[serde(default = "default_failed_log")]
    pub failed_log: PathBuf,
    #[serde(default = "default_commands_file")]
    pub commands_file: PathBuf,
    #[serde(default = "default_tagger_program")]
    pub program: String,
    #[serde(default = "default_tagger_args")]
    pub args: Vec<String>,
    /// Arguments used when launching the application for the liveness check.
    #[serde(default)]
    pub start_args: Vec<String>,
    #[serde(default = "default_tagger_program")]
    pub process_name: String,
    #[serde(default = "default_startup_delay")]
    pub startup_delay_secs: u64,
    /// Zero means the pass loop runs until a pass classifies nothing.
    #[serde(default)]
    pub max_passes: u32,
}

fn default_logfile() -> PathBuf {
    PathBuf::from("album-artwork.log")
}

fn default_temp_res() -> u32 {
    600
}

fn default_processed_log() -> PathBuf {
    PathBuf::from("processed_albums.txt")
}

fn default_failed_log() -> PathBuf {
    PathBuf::from("failed_albums.txt")
}

fn default_commands_file() -> PathBuf {
    PathBuf::from("commands.txt")
}

fn default_tagger_program() -> String {
    "picard".into()
}

fn default_tagger_args() -> Vec<String> {
    ["-e", "LOAD {album}", "-e", "FROM_FILE {commands}"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_startup_delay() -> u64 {
    10
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn music_root(&self) -> Result<&Path> {
        self.paths
            .rootmusicdir
            .as_deref()
            .context("Missing 'rootmusicdir' in section 'paths' of config file")
    }

    pub fn batch(&self) -> Result<&BatchConfig> {
        self.batch
            .as_ref()
            .context("Missing section 'batch' in config file")
    }
}
