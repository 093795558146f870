//! The per-task pipeline: decode, resolve geometry, render, encode.
//!
//! Stages run strictly in sequence for one task. The whole function is
//! synchronous and CPU-bound; the orchestrator calls it inside
//! `spawn_blocking` so the async runtime is never blocked.

use tracing::debug;

use crate::core::{EncodedResult, PipelineConfig, SourceImage};
use crate::processing::{encoder, geometry, renderer};
use crate::utils::PipelineResult;

/// Everything a completed task carries back to the orchestrator.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub encoded: EncodedResult,
    pub resolution_warning: bool,
}

/// Runs one source image through the full pipeline.
pub fn process(source: &SourceImage, config: &PipelineConfig) -> PipelineResult<PipelineOutcome> {
    let image = renderer::decode(&source.bytes)?;
    debug!(
        "decoded '{}': {}x{}",
        source.file_name,
        image.width(),
        image.height()
    );

    let plan = geometry::resolve(image.width(), image.height(), config)?;
    let rendered = renderer::render(&image, &plan)?;
    let encoded = encoder::encode(&rendered, source.byte_size(), config)?;

    debug!(
        "'{}' -> {} bytes as {} ({:.1}% of the upload saved)",
        source.file_name,
        encoded.byte_size,
        encoded.mime_type(),
        encoded.compression_ratio * 100.0
    );

    Ok(PipelineOutcome {
        encoded,
        resolution_warning: plan.upscale_warning,
    })
}
