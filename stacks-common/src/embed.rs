use crate::cover::{COVER_FILE_NAME, CoverImage, should_replace};
use crate::tags;
use crate::walker;
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmbedReport {
    pub embedded: usize,
    pub kept: usize,
    pub failed: usize,
}

/// Read `cover.jpg` from `folder`, normalized to a JPEG no larger than
/// `temp_res` on both sides.
///
/// A missing, empty or undecodable cover is reported and yields `None`.
pub fn load_cover(folder: &Path, temp_res: u32) -> Result<Option<CoverImage>> {
    let cover_path = folder.join(COVER_FILE_NAME);
    if !cover_path.exists() {
        tracing::info!("Cover image not found in {}. Skipping...", folder.display());
        return Ok(None);
    }

    let cover = match CoverImage::from_path(&cover_path) {
        Ok(cover) => cover,
        Err(e) => {
            tracing::warn!("{e:#}. Skipping...");
            return Ok(None);
        }
    };
    tracing::info!(
        "Found cover image in {} with format {:?} at {}",
        folder.display(),
        cover.format,
        cover.resolution
    );

    Ok(Some(cover.into_jpeg()?.fit_within(temp_res)?))
}

/// Embed `cover` into one file unless it already holds artwork at least as
/// large. Returns whether the file was rewritten.
pub fn embed_in_file(path: &Path, cover: &CoverImage) -> Result<bool> {
    let existing = tags::embedded_resolution(path)?;

    if !should_replace(existing, cover.resolution) {
        if let Some(existing) = existing {
            tracing::info!(
                "{}: embedded artwork {existing} is not smaller than {}, keeping it",
                path.display(),
                cover.resolution
            );
        }
        return Ok(false);
    }

    tags::write_front_cover(path, &cover.bytes)?;
    tracing::info!("Embedded {} artwork in {}", cover.resolution, path.display());
    Ok(true)
}

/// Embed `cover` into every audio file directly inside `folder`.
pub fn embed_cover(folder: &Path, cover: CoverImage) -> Result<EmbedReport> {
    let cover = cover.into_jpeg()?;
    let mut report = EmbedReport::default();

    for file in walker::audio_files(folder)? {
        match embed_in_file(&file, &cover) {
            Ok(true) => report.embedded += 1,
            Ok(false) => report.kept += 1,
            Err(e) => {
                tracing::error!("Error processing {}: {e:#}", file.display());
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Embed the folder's `cover.jpg`, `None` when there is no usable cover.
pub fn embed_folder(folder: &Path, temp_res: u32) -> Result<Option<EmbedReport>> {
    let Some(cover) = load_cover(folder, temp_res)? else {
        return Ok(None);
    };
    embed_cover(folder, cover).map(Some)
}
