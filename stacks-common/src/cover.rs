//! Cover image decoding, resolution comparison and JPEG normalization.

use anyhow::{Context, Result, bail};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;

pub const COVER_FILE_NAME: &str = "cover.jpg";

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Both sides are at least `min` pixels.
    #[must_use]
    pub fn meets(self, min: u32) -> bool {
        self.width >= min && self.height >= min
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Whether `candidate` may replace the artwork currently embedded.
///
/// Embedded artwork only ever grows: a candidate wins when nothing is embedded
/// or when it has strictly more pixels.
#[must_use]
pub fn should_replace(existing: Option<Resolution>, candidate: Resolution) -> bool {
    existing.is_none_or(|existing| candidate.area() > existing.area())
}

#[derive(Debug, Clone)]
pub struct CoverImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub resolution: Resolution,
}

impl CoverImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (format, resolution) = probe(&bytes)?;
        Ok(Self {
            bytes,
            format,
            resolution,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
        if bytes.is_empty() {
            bail!("Image file is empty: {}", path.display());
        }
        Self::from_bytes(bytes)
            .with_context(|| format!("Invalid or unsupported image {}", path.display()))
    }

    #[must_use]
    pub fn is_jpeg(&self) -> bool {
        self.format == ImageFormat::Jpeg
    }

    /// Re-encode as JPEG unless it already is one.
    pub fn into_jpeg(self) -> Result<Self> {
        if self.is_jpeg() {
            return Ok(self);
        }
        let decoded = self.decode()?;
        encode_jpeg(&decoded)
    }

    /// Scale down to fit a `max_edge` square when both sides reach it.
    ///
    /// Smaller images are returned untouched, never upscaled.
    pub fn fit_within(self, max_edge: u32) -> Result<Self> {
        if !self.resolution.meets(max_edge) {
            return Ok(self);
        }
        let decoded = self.decode()?;
        let resized = decoded.resize(max_edge, max_edge, FilterType::Lanczos3);
        encode_jpeg(&resized)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.bytes)
            .with_context(|| format!("Failed to write image {}", path.display()))
    }

    fn decode(&self) -> Result<DynamicImage> {
        image::load_from_memory(&self.bytes).context("Failed to decode image")
    }
}

/// Detect the format and dimensions without decoding pixel data.
pub fn probe(bytes: &[u8]) -> Result<(ImageFormat, Resolution)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Failed to inspect image")?;
    let format = reader.format().context("Unrecognised image format")?;
    let (width, height) = reader
        .into_dimensions()
        .context("Failed to read image dimensions")?;
    if width == 0 || height == 0 {
        bail!("Image has no pixels");
    }
    Ok((format, Resolution::new(width, height)))
}

fn encode_jpeg(image: &DynamicImage) -> Result<CoverImage> {
    // JPEG has no alpha channel, flatten RGBA / palette images first.
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&rgb)
        .context("Failed to encode JPEG")?;

    Ok(CoverImage {
        bytes,
        format: ImageFormat::Jpeg,
        resolution: Resolution::new(rgb.width(), rgb.height()),
    })
}
