//! Image resizing and encoding.
//!
//! JPEG and lossless WebP encode via the `image` crate, AVIF via `ravif`.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType};
use ravif::{Encoder, Img, RGBA8};

use crate::config::ImageFormat;

const JPEG_QUALITY: u8 = 82;
const AVIF_QUALITY: f32 = 70.0;
const AVIF_SPEED: u8 = 6;

/// Resize to the target width, preserving aspect ratio. Never upscales.
pub fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    if width >= img.width() {
        return img.clone();
    }
    let height = ((u64::from(width) * u64::from(img.height())) / u64::from(img.width())).max(1);
    img.resize_exact(width, height as u32, FilterType::Lanczos3)
}

/// Encode an image into the given format.
pub fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    match format {
        ImageFormat::Jpeg => encode_jpeg(img),
        ImageFormat::Webp => encode_webp(img),
        ImageFormat::Avif => encode_avif(img),
    }
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), JPEG_QUALITY);
    encoder.encode_image(&rgb).context("jpeg encoding failed")?;
    Ok(buf)
}

fn encode_webp(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut buf = Vec::new();
    WebPEncoder::new_lossless(Cursor::new(&mut buf))
        .encode(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
        .context("webp encoding failed")?;
    Ok(buf)
}

fn encode_avif(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels: Vec<RGBA8> = rgba
        .pixels()
        .map(|p| RGBA8::new(p[0], p[1], p[2], p[3]))
        .collect();

    let encoded = Encoder::new()
        .with_quality(AVIF_QUALITY)
        .with_speed(AVIF_SPEED)
        .encode_rgba(Img::new(pixels.as_slice(), width as usize, height as usize))
        .context("avif encoding failed")?;
    Ok(encoded.avif_file)
}
