use crate::cover::{self, Resolution};
use anyhow::{Context, Result};
use lofty::config::WriteOptions;
use lofty::file::TaggedFile;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::path::Path;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumInfo {
    pub artist: String,
    pub album: String,
}

fn read_tagged(path: &Path) -> Result<TaggedFile> {
    let path_display = path.display();
    Probe::open(path)
        .with_context(|| format!("Failed to open file: {path_display}"))?
        .read()
        .with_context(|| format!("Failed to read tags from {path_display}"))
}

/// Artist and album of a file, falling back to placeholders when the tags
/// are missing or unreadable.
#[must_use]
pub fn album_info(path: &Path) -> AlbumInfo {
    let tagged_file = match read_tagged(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::error!("{e:#}");
            return AlbumInfo {
                artist: UNKNOWN_ARTIST.into(),
                album: UNKNOWN_ALBUM.into(),
            };
        }
    };

    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
    let artist = tag
        .and_then(|t| t.artist().map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST.into());
    let album = tag
        .and_then(|t| t.album().map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ALBUM.into());

    AlbumInfo { artist, album }
}

/// The embedded front cover, or the first picture of any kind.
pub fn embedded_picture(path: &Path) -> Result<Option<Picture>> {
    let tagged_file = read_tagged(path)?;
    let pictures: Vec<&Picture> = tagged_file
        .primary_tag()
        .into_iter()
        .chain(tagged_file.tags())
        .flat_map(Tag::pictures)
        .collect();

    let picture = pictures
        .iter()
        .find(|p| p.pic_type() == PictureType::CoverFront)
        .or_else(|| pictures.first())
        .map(|p| (*p).clone());

    Ok(picture)
}

/// Resolution of the embedded artwork, `None` if there is none or it cannot
/// be decoded.
pub fn embedded_resolution(path: &Path) -> Result<Option<Resolution>> {
    let Some(picture) = embedded_picture(path)? else {
        return Ok(None);
    };

    match cover::probe(picture.data()) {
        Ok((_, resolution)) => Ok(Some(resolution)),
        Err(e) => {
            tracing::debug!("Unreadable embedded artwork in {}: {e:#}", path.display());
            Ok(None)
        }
    }
}

/// Replace all artwork in the primary tag with `jpeg` as the front cover.
pub fn write_front_cover(path: &Path, jpeg: &[u8]) -> Result<()> {
    let mut tagged_file = read_tagged(path)?;

    if tagged_file.primary_tag().is_none() {
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged_file
        .primary_tag_mut()
        .context("No primary tag found")?;

    while !tag.pictures().is_empty() {
        tag.remove_picture(tag.pictures().len() - 1);
    }
    tag.push_picture(Picture::new_unchecked(
        PictureType::CoverFront,
        Some(MimeType::Jpeg),
        None,
        jpeg.to_vec(),
    ));

    tagged_file
        .save_to_path(path, WriteOptions::default())
        .with_context(|| format!("Failed to write tags to {}", path.display()))
}
