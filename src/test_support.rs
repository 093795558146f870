//! Shared helpers for unit tests: tiny in-memory images, no fixture files.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};

/// Smooth gradient: compresses very well in both PNG and JPEG.
pub fn gradient_pixels(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            128,
        ])
    })
}

/// Deterministic pseudo-random noise: barely compresses at all.
pub fn noise_pixels(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u8
    };
    let mut img = RgbImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = Rgb([next(), next(), next()]);
    }
    img
}

pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    png_bytes(&gradient_pixels(width, height))
}

pub fn noise_png(width: u32, height: u32, seed: u64) -> Vec<u8> {
    png_bytes(&noise_pixels(width, height, seed))
}

pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels = gradient_pixels(width, height);
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, 90);
    encoder
        .encode(pixels.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

fn png_bytes(pixels: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
