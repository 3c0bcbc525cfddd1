use super::{ArtworkSource, Candidate, SourceKind, download};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

const SEARCH_URL: &str = "https://itunes.apple.com/search";
const THUMBNAIL_SIZE: &str = "100x100bb";
const STANDARD_EDGE: u32 = 600;
const HIRES_EDGE: u32 = 3000;

/// Album search on the iTunes catalog.
pub struct ITunesSource {
    client: Client,
    edge: u32,
}

impl ITunesSource {
    #[must_use]
    pub fn new(client: Client, hires: bool) -> Self {
        let edge = if hires { HIRES_EDGE } else { STANDARD_EDGE };
        Self { client, edge }
    }
}

impl ArtworkSource for ITunesSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ITunes
    }

    fn lookup(&self, artist: &str, album: &str) -> Result<Vec<Candidate>> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("term", album), ("entity", "album"), ("media", "music")])
            .send()
            .context("Failed to send iTunes request")?;

        if !response.status().is_success() {
            tracing::warn!("iTunes search failed with status: {}", response.status());
            return Ok(vec![]);
        }

        let search_result: ITunesResponse =
            response.json().context("Failed to parse iTunes response")?;

        let Some(url) = artwork_url(&search_result, artist, self.edge) else {
            return Ok(vec![]);
        };

        Ok(vec![download(&self.client, self.kind(), &url)?])
    }
}

/// Artwork of the first result by `artist`, rewritten to `edge` pixels.
fn artwork_url(response: &ITunesResponse, artist: &str, edge: u32) -> Option<String> {
    response
        .results
        .iter()
        .find(|r| {
            r.artist_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase() == artist.to_lowercase())
        })
        .and_then(|r| r.artwork_url_100.as_deref())
        .map(|url| url.replace(THUMBNAIL_SIZE, &format!("{edge}x{edge}bb")))
}

#[derive(Deserialize, Debug)]
struct ITunesResponse {
    #[serde(default)]
    results: Vec<ITunesAlbum>,
}

#[derive(Deserialize, Debug)]
struct ITunesAlbum {
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
}
