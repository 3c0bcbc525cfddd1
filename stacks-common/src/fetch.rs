use crate::cover::{COVER_FILE_NAME, Resolution};
use crate::resolver::{Lookup, Resolver};
use crate::sources::SourceKind;
use crate::tags;
use crate::walker;
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent,
    NoAudio,
    Saved {
        source: SourceKind,
        resolution: Resolution,
    },
    NotFound,
}

/// Look up artwork for the album in `folder` and save it as `cover.jpg`.
///
/// Folders that already have a cover are left alone.
pub fn fetch_for_folder(resolver: &Resolver, folder: &Path) -> Result<FetchOutcome> {
    let cover_path = folder.join(COVER_FILE_NAME);
    if cover_path.exists() {
        tracing::info!("Skipping {}: {COVER_FILE_NAME} already exists.", folder.display());
        return Ok(FetchOutcome::AlreadyPresent);
    }

    let files = walker::audio_files(folder)?;
    let Some(first) = files.first() else {
        tracing::warn!("No audio files found in {}", folder.display());
        return Ok(FetchOutcome::NoAudio);
    };

    let info = tags::album_info(first);
    tracing::info!(
        "Processing folder: {}, Artist: {}, Album: {}",
        folder.display(),
        info.artist,
        info.album
    );

    match resolver.resolve(&info.artist, &info.album) {
        Lookup::Found(candidate) => {
            let source = candidate.source;
            let image = candidate.image.into_jpeg()?;
            image.write_to(&cover_path)?;
            tracing::info!(
                "Artwork saved for {} - {} at {} ({source}, {})",
                info.artist,
                info.album,
                cover_path.display(),
                image.resolution
            );
            Ok(FetchOutcome::Saved {
                source,
                resolution: image.resolution,
            })
        }
        Lookup::NotFound => {
            tracing::warn!("No artwork found for {} - {}", info.artist, info.album);
            Ok(FetchOutcome::NotFound)
        }
    }
}
