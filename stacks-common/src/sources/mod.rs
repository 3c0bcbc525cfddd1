pub mod itunes;
pub mod lastfm;
pub mod musicbrainz;

use crate::config::Config;
use crate::cover::{CoverImage, Resolution};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    MusicBrainz,
    ITunes,
    LastFm,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::MusicBrainz => "MusicBrainz",
            SourceKind::ITunes => "iTunes",
            SourceKind::LastFm => "Last.fm",
        };
        f.write_str(name)
    }
}

/// An image offered by a source, already downloaded.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub source: SourceKind,
    pub image: CoverImage,
}

impl Candidate {
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.image.resolution
    }
}

/// One online artwork lookup service.
pub trait ArtworkSource {
    fn kind(&self) -> SourceKind;

    /// Zero or more candidates for the album. Errors mean "no result" to the
    /// caller, they never abort a resolution.
    fn lookup(&self, artist: &str, album: &str) -> Result<Vec<Candidate>>;
}

pub fn http_client(contact_email: &str, timeout_secs: u64) -> Result<Client> {
    let agent = if contact_email.is_empty() {
        format!("stacks/{}", env!("CARGO_PKG_VERSION"))
    } else {
        format!("stacks/{} ( {contact_email} )", env!("CARGO_PKG_VERSION"))
    };

    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&agent).context("Invalid contact email for User-Agent")?,
    );

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    Ok(client)
}

/// Sources enabled by the configuration, in configured priority order.
pub fn from_config(config: &Config) -> Result<Vec<Box<dyn ArtworkSource>>> {
    let settings = &config.settings;
    let email = config.musicbrainz.useragent_email.trim();

    if settings.use_musicbrainz
        && settings.sources.contains(&SourceKind::MusicBrainz)
        && email.is_empty()
    {
        bail!("Missing 'useragent_email' in section 'musicbrainz' in config file");
    }

    let client = http_client(email, settings.http_timeout_secs)?;
    let mut sources: Vec<Box<dyn ArtworkSource>> = Vec::new();

    for kind in &settings.sources {
        if sources.iter().any(|s| s.kind() == *kind) {
            continue;
        }
        match kind {
            SourceKind::MusicBrainz => {
                if settings.use_musicbrainz {
                    sources.push(Box::new(musicbrainz::MusicBrainzSource::new(client.clone())));
                }
            }
            SourceKind::ITunes => {
                sources.push(Box::new(itunes::ITunesSource::new(
                    client.clone(),
                    settings.use_hires,
                )));
            }
            SourceKind::LastFm => match &config.credentials.lastfm_apikey {
                Some(key) if !key.trim().is_empty() => {
                    sources.push(Box::new(lastfm::LastFmSource::new(
                        client.clone(),
                        key.trim().to_string(),
                    )));
                }
                _ => tracing::info!("Last.fm disabled: no 'lastfm-apikey' configured"),
            },
        }
    }

    Ok(sources)
}

/// Download an image and learn its dimensions.
pub(crate) fn download(client: &Client, source: SourceKind, url: &str) -> Result<Candidate> {
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to download artwork from {url}"))?;

    if !response.status().is_success() {
        bail!(
            "Artwork download from {url} failed with status: {}",
            response.status()
        );
    }

    let is_image = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("image"));
    if !is_image {
        bail!("URL does not point to an image: {url}");
    }

    let bytes = response
        .bytes()
        .with_context(|| format!("Failed to read artwork body from {url}"))?;
    let image = CoverImage::from_bytes(bytes.to_vec())
        .with_context(|| format!("Downloaded artwork from {url} is not a usable image"))?;

    Ok(Candidate { source, image })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &str) -> Config {
        Config::parse(&format!("[paths]\nrootmusicdir = \"/music\"\n{extra}")).unwrap()
    }

    fn kinds(sources: &[Box<dyn ArtworkSource>]) -> Vec<SourceKind> {
        sources.iter().map(|s| s.kind()).collect()
    }

    #[test]
    fn musicbrainz_requires_contact_email() {
        assert!(from_config(&config("")).is_err());
    }

    #[test]
    fn default_order_without_lastfm_key() {
        let sources = from_config(&config(
            "[musicbrainz]\nuseragent_email = \"me@example.org\"\n",
        ))
        .unwrap();

        assert_eq!(
            kinds(&sources),
            vec![SourceKind::MusicBrainz, SourceKind::ITunes]
        );
    }

    #[test]
    fn configured_order_is_respected() {
        let sources = from_config(&config(
            r#"
[settings]
USE_MUSICBRAINZ = false
SOURCES = ["lastfm", "itunes", "musicbrainz", "itunes"]

[credentials]
lastfm-apikey = "key"
"#,
        ))
        .unwrap();

        assert_eq!(kinds(&sources), vec![SourceKind::LastFm, SourceKind::ITunes]);
    }

    #[test]
    fn display_names() {
        assert_eq!(SourceKind::ITunes.to_string(), "iTunes");
        assert_eq!(SourceKind::LastFm.to_string(), "Last.fm");
    }
}
