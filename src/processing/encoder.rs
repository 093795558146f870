//! Size-constrained encoding.
//!
//! Turns the lossless intermediate into the final output under the byte
//! ceiling while giving up as little quality as possible:
//!
//! 1. Fast path: when the lossless PNG already fits, it is returned
//!    untouched. No lossy generation is spent on an image that never
//!    needed one.
//! 2. Otherwise the canvas is JPEG-encoded starting at maximum quality and
//!    stepping down until the output fits. Dimensions are never reduced,
//!    only the quality is traded.
//! 3. Below the minimum acceptable quality the task fails with a
//!    distinguishable reason; an oversized file is never emitted.

use image::{ExtendedColorType, RgbImage};
use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

use crate::core::{EncodedResult, PipelineConfig};
use crate::processing::renderer::RenderedImage;
use crate::utils::{ImageFormat, PipelineError, PipelineResult};

const MAX_QUALITY: u8 = 100;
const MIN_QUALITY: u8 = 30;
const QUALITY_STEP: u8 = 5;

/// Encodes the rendered canvas to at most `output_ceiling_bytes`.
///
/// `original_bytes` is the byte size of the user's upload; the reported
/// compression ratio is always computed against it, never against the
/// lossless intermediate (which is typically larger than the upload and
/// would make every result look like a size increase).
pub fn encode(
    rendered: &RenderedImage,
    original_bytes: u64,
    config: &PipelineConfig,
) -> PipelineResult<EncodedResult> {
    let ceiling = config.output_ceiling_bytes;

    if rendered.png_bytes.len() as u64 <= ceiling {
        debug!(
            "lossless intermediate fits the ceiling ({} <= {}), skipping re-encode",
            rendered.png_bytes.len(),
            ceiling
        );
        return Ok(EncodedResult::new(
            rendered.png_bytes.clone(),
            ImageFormat::Png,
            original_bytes,
        ));
    }

    let mut quality = MAX_QUALITY;
    loop {
        let bytes = encode_jpeg(&rendered.pixels, quality)?;
        debug!("JPEG at quality {} is {} bytes (ceiling {})", quality, bytes.len(), ceiling);

        if bytes.len() as u64 <= ceiling {
            return Ok(EncodedResult::new(bytes, ImageFormat::Jpeg, original_bytes));
        }
        if quality == MIN_QUALITY {
            return Err(PipelineError::compression_limit(ceiling));
        }
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
    }
}

fn encode_jpeg(pixels: &RgbImage, quality: u8) -> PipelineResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .encode(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| PipelineError::processing(format!("JPEG encode failed: {e}")))?;
    Ok(bytes)
}
