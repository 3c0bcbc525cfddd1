use crate::cover::{COVER_FILE_NAME, CoverImage, Resolution};
use crate::tags;
use crate::walker;
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    Written(Resolution),
    AlreadyPresent,
    NoAudio,
    NoArtwork,
}

/// Write the first audio file's embedded artwork to `cover.jpg`.
///
/// A folder that already has `cover.jpg` is skipped without looking at it.
pub fn extract_folder(folder: &Path) -> Result<ExtractOutcome> {
    let cover_path = folder.join(COVER_FILE_NAME);
    if cover_path.exists() {
        tracing::info!("Cover image already exists in {}. Skipping...", folder.display());
        return Ok(ExtractOutcome::AlreadyPresent);
    }

    let files = walker::audio_files(folder)?;
    let Some(first) = files.first() else {
        tracing::info!("No audio files found in {}. Skipping...", folder.display());
        return Ok(ExtractOutcome::NoAudio);
    };

    let Some(picture) = tags::embedded_picture(first)? else {
        tracing::info!("No embedded artwork in {}", first.display());
        return Ok(ExtractOutcome::NoArtwork);
    };

    let image = CoverImage::from_bytes(picture.data().to_vec())
        .and_then(CoverImage::into_jpeg)
        .with_context(|| format!("Embedded artwork in {} is unusable", first.display()))?;
    image.write_to(&cover_path)?;

    tracing::info!(
        "Exported cover art from {} to {}",
        first.display(),
        cover_path.display()
    );
    Ok(ExtractOutcome::Written(image.resolution))
}
