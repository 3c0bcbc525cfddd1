use super::{ArtworkSource, Candidate, SourceKind, download};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

const API_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

pub struct LastFmSource {
    client: Client,
    api_key: String,
}

impl LastFmSource {
    #[must_use]
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

impl ArtworkSource for LastFmSource {
    fn kind(&self) -> SourceKind {
        SourceKind::LastFm
    }

    fn lookup(&self, artist: &str, album: &str) -> Result<Vec<Candidate>> {
        let response = self
            .client
            .get(API_BASE_URL)
            .query(&[
                ("method", "album.getinfo"),
                ("api_key", self.api_key.as_str()),
                ("artist", artist),
                ("album", album),
                ("format", "json"),
            ])
            .send()
            .context("Failed to send Last.fm request")?;

        if !response.status().is_success() {
            tracing::warn!("Last.fm lookup failed with status: {}", response.status());
            return Ok(vec![]);
        }

        let info: AlbumInfoResponse = response.json().context("Failed to parse Last.fm response")?;
        if let Some(message) = &info.message {
            tracing::debug!("Last.fm: {message}");
        }

        let Some(url) = largest_image(&info) else {
            return Ok(vec![]);
        };

        Ok(vec![download(&self.client, self.kind(), url)?])
    }
}

// Images are listed smallest first.
fn largest_image(info: &AlbumInfoResponse) -> Option<&str> {
    info.album
        .as_ref()?
        .image
        .iter()
        .rev()
        .map(|image| image.url.trim())
        .find(|url| !url.is_empty())
}

#[derive(Debug, Deserialize)]
struct AlbumInfoResponse {
    album: Option<AlbumInfo>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumInfo {
    #[serde(default)]
    image: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    #[serde(rename = "#text")]
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_non_empty_image_wins() {
        let info: AlbumInfoResponse = serde_json::from_str(
            r##"{"album": {"name": "Fresh", "image": [
                {"#text": "https://lastfm/34s.png", "size": "small"},
                {"#text": "https://lastfm/300x300.png", "size": "extralarge"},
                {"#text": "", "size": "mega"}
            ]}}"##,
        )
        .unwrap();

        assert_eq!(largest_image(&info), Some("https://lastfm/300x300.png"));
    }

    #[test]
    fn error_response_has_no_image() {
        let info: AlbumInfoResponse =
            serde_json::from_str(r#"{"error": 6, "message": "Album not found"}"#).unwrap();

        assert_eq!(largest_image(&info), None);
        assert_eq!(info.message.as_deref(), Some("Album not found"));
    }
}
