//! Synthetic images and audio files for tests.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;

// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, mono: 417 bytes per frame.
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC4];
const FRAME_LEN: usize = 417;
const FRAME_COUNT: usize = 24;

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgb = RgbImage::from_pixel(width, height, Rgb([90, 140, 210]));
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, 85)
        .encode_image(&DynamicImage::ImageRgb8(rgb))
        .expect("jpeg encoding should succeed");
    encoded
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgba = RgbaImage::from_pixel(width, height, Rgba([8, 16, 24, 255]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("png encoding should succeed");
    cursor.into_inner()
}

/// A tagless MP3 made of silent frames.
pub fn write_silent_mp3(path: &Path) {
    let mut data = Vec::with_capacity(FRAME_LEN * FRAME_COUNT);
    for _ in 0..FRAME_COUNT {
        data.extend_from_slice(&FRAME_HEADER);
        data.resize(data.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    fs::write(path, data).expect("writing mp3 fixture should succeed");
}
