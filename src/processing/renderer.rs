//! Canvas rendering: decode, scale and center-crop onto the target canvas.
//!
//! The output of this stage is deliberately lossless. The canvas is kept as
//! raw pixels plus their PNG encoding so the encoder can take the fast path
//! without re-reading pixels, and so no lossy generation is ever stacked on
//! top of another before the final encode.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::processing::geometry::GeometryPlan;
use crate::utils::{PipelineError, PipelineResult};

/// The lossless intermediate produced by rendering.
pub struct RenderedImage {
    /// Canvas pixels, exactly target_width x target_height
    pub pixels: RgbImage,
    /// PNG encoding of the canvas; its length drives the encoder fast path
    pub png_bytes: Vec<u8>,
}

/// Decodes raw upload bytes into pixels.
///
/// Failures here mean the environment could not open the image at all
/// (corrupt or truncated data, unsupported variant) and surface as the
/// decode error class, distinct from compression failures.
pub fn decode(bytes: &[u8]) -> PipelineResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| PipelineError::decode(e.to_string()))
}

/// Draws `image` onto a canvas sized exactly per `plan`.
///
/// The source is scaled with Lanczos3 (high-quality smoothing) to the plan's
/// scaled dimensions, then the centered window of the canvas size is cut
/// out. The result is PNG-encoded so this stage stays lossless.
pub fn render(image: &DynamicImage, plan: &GeometryPlan) -> PipelineResult<RenderedImage> {
    let scaled = image.resize_exact(plan.scaled_width, plan.scaled_height, FilterType::Lanczos3);

    // Offsets are zero or negative; the crop window starts where the
    // overflow begins.
    let crop_x = (-plan.offset_x).max(0) as u32;
    let crop_y = (-plan.offset_y).max(0) as u32;
    let pixels = scaled
        .crop_imm(crop_x, crop_y, plan.target_width, plan.target_height)
        .to_rgb8();

    debug!(
        "rendered {}x{} canvas (scaled {}x{}, crop at {},{})",
        plan.target_width, plan.target_height, plan.scaled_width, plan.scaled_height, crop_x, crop_y
    );

    let mut png_bytes = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
        .map_err(|e| PipelineError::processing(format!("PNG encode failed: {e}")))?;

    Ok(RenderedImage { pixels, png_bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineConfig;
    use crate::processing::geometry;

    #[test]
    fn corrupt_bytes_fail_with_a_decode_error() {
        let err = decode(&[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn canvas_has_exactly_the_target_dimensions() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_fn(640, 360, |x, _| {
            image::Rgb([(x % 256) as u8, 64, 128])
        }));
        let plan = geometry::resolve(640, 360, &PipelineConfig::default()).unwrap();
        let rendered = render(&source, &plan).unwrap();

        assert_eq!(rendered.pixels.width(), 1280);
        assert_eq!(rendered.pixels.height(), 720);
        assert!(!rendered.png_bytes.is_empty());
    }

    #[test]
    fn portrait_source_is_center_cropped() {
        // Left half black, right half white: after a horizontal-overflow-free
        // vertical crop the split must still sit in the middle.
        let source = DynamicImage::ImageRgb8(RgbImage::from_fn(1000, 2000, |x, _| {
            if x < 500 { image::Rgb([0, 0, 0]) } else { image::Rgb([255, 255, 255]) }
        }));
        let plan = geometry::resolve(1000, 2000, &PipelineConfig::default()).unwrap();
        let rendered = render(&source, &plan).unwrap();

        assert_eq!(rendered.pixels.width(), 1280);
        let left = rendered.pixels.get_pixel(10, 360).0;
        let right = rendered.pixels.get_pixel(1270, 360).0;
        assert!(left[0] < 16, "left edge should stay dark, got {left:?}");
        assert!(right[0] > 239, "right edge should stay light, got {right:?}");
    }

    #[test]
    fn png_round_trips_losslessly() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_fn(1280, 720, |x, y| {
            image::Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8])
        }));
        let plan = geometry::resolve(1280, 720, &PipelineConfig::default()).unwrap();
        let rendered = render(&source, &plan).unwrap();

        let reloaded = image::load_from_memory(&rendered.png_bytes).unwrap().to_rgb8();
        assert_eq!(reloaded.as_raw(), rendered.pixels.as_raw());
    }
}
