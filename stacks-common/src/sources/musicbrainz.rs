use super::{ArtworkSource, Candidate, SourceKind, download};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

const SEARCH_URL: &str = "https://musicbrainz.org/ws/2/release";
const COVER_ART_ARCHIVE_URL: &str = "https://coverartarchive.org/release";

/// Release search on MusicBrainz, front cover from the Cover Art Archive.
pub struct MusicBrainzSource {
    client: Client,
}

impl MusicBrainzSource {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn release_id(&self, artist: &str, album: &str) -> Result<Option<String>> {
        let query = search_query(artist, album);

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("query", query.as_str()), ("fmt", "json"), ("limit", "1")])
            .send()
            .context("Failed to send MusicBrainz request")?;

        if !response.status().is_success() {
            tracing::warn!("MusicBrainz search failed with status: {}", response.status());
            return Ok(None);
        }

        let search_result: MbSearchResponse = response
            .json()
            .context("Failed to parse MusicBrainz response")?;

        Ok(search_result.releases.into_iter().next().map(|r| r.id))
    }

    fn front_cover_url(&self, release_id: &str) -> Result<Option<String>> {
        let url = format!("{COVER_ART_ARCHIVE_URL}/{release_id}");
        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to send Cover Art Archive request")?;

        // The archive answers 404 for releases without artwork.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            tracing::warn!(
                "Cover Art Archive lookup failed with status: {}",
                response.status()
            );
            return Ok(None);
        }

        let listing: CaaListing = response
            .json()
            .context("Failed to parse Cover Art Archive response")?;

        Ok(front_image(listing))
    }
}

impl ArtworkSource for MusicBrainzSource {
    fn kind(&self) -> SourceKind {
        SourceKind::MusicBrainz
    }

    fn lookup(&self, artist: &str, album: &str) -> Result<Vec<Candidate>> {
        let Some(release_id) = self.release_id(artist, album)? else {
            return Ok(vec![]);
        };
        tracing::debug!("MusicBrainz release for {artist} - {album}: {release_id}");

        let Some(url) = self.front_cover_url(&release_id)? else {
            return Ok(vec![]);
        };

        Ok(vec![download(&self.client, self.kind(), &url)?])
    }
}

fn search_query(artist: &str, album: &str) -> String {
    let artist = artist.replace('"', "\\\"");
    let album = album.replace('"', "\\\"");
    format!("artist:\"{artist}\" AND release:\"{album}\"")
}

fn front_image(listing: CaaListing) -> Option<String> {
    listing
        .images
        .into_iter()
        .find(|image| image.front)
        .map(|image| image.image)
}

// --- Serde Structs ---

#[derive(Deserialize, Debug)]
struct MbSearchResponse {
    #[serde(default)]
    releases: Vec<MbRelease>,
}

#[derive(Deserialize, Debug)]
struct MbRelease {
    id: String,
}

#[derive(Deserialize, Debug)]
struct CaaListing {
    #[serde(default)]
    images: Vec<CaaImage>,
}

#[derive(Deserialize, Debug)]
struct CaaImage {
    #[serde(default)]
    front: bool,
    image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_escaped_in_search() {
        assert_eq!(
            search_query("Sly & the \"Family\" Stone", "Fresh"),
            r#"artist:"Sly & the \"Family\" Stone" AND release:"Fresh""#
        );
    }

    #[test]
    fn front_cover_is_picked_from_listing() {
        let listing: CaaListing = serde_json::from_str(
            r#"{
                "images": [
                    {"front": false, "back": true, "image": "http://caa/back.jpg"},
                    {"front": true, "back": false, "image": "http://caa/front.jpg"}
                ],
                "release": "https://musicbrainz.org/release/abc"
            }"#,
        )
        .unwrap();

        assert_eq!(front_image(listing).as_deref(), Some("http://caa/front.jpg"));
    }

    #[test]
    fn listing_without_front_cover() {
        let listing: CaaListing =
            serde_json::from_str(r#"{"images": [{"front": false, "image": "x"}]}"#).unwrap();
        assert_eq!(front_image(listing), None);
    }

    #[test]
    fn search_response_takes_first_release() {
        let response: MbSearchResponse = serde_json::from_str(
            r#"{"created": "2024", "count": 2, "releases": [{"id": "first", "score": 100}, {"id": "second"}]}"#,
        )
        .unwrap();
        assert_eq!(response.releases[0].id, "first");
    }
}
