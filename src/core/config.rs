use serde::{Deserialize, Serialize};

use crate::utils::{ValidationError, OptimizerResult};

/// A fixed target canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub width: u32,
    pub height: u32,
}

impl Preset {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Global knobs for the thumbnail pipeline.
///
/// The defaults mirror the production values: a 2 MiB output ceiling (the
/// platform's thumbnail limit), a 10 MiB upload ceiling, the two 16:9 canvas
/// presets, and the recommended minimum resolution below which an upscale
/// warning is raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum accepted input file size, checked before queuing
    pub upload_ceiling_bytes: u64,
    /// Maximum output file size; `Done` results never exceed this
    pub output_ceiling_bytes: u64,
    /// Canvas used when the source width is at least `preset_large.width`
    pub preset_large: Preset,
    /// Canvas used for everything narrower
    pub preset_small: Preset,
    /// Sources narrower than this raise a resolution warning
    pub min_recommended_width: u32,
    /// Sources shorter than this raise a resolution warning
    pub min_recommended_height: u32,
    /// Files beyond this count are silently dropped from a submission
    /// (the skipped count is reported back)
    pub max_batch_size: usize,
    /// Upper bound on simultaneously processing tasks
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upload_ceiling_bytes: 10 * 1024 * 1024,
            output_ceiling_bytes: 2 * 1024 * 1024,
            preset_large: Preset::new(1920, 1080),
            preset_small: Preset::new(1280, 720),
            min_recommended_width: 1280,
            min_recommended_height: 720,
            max_batch_size: 20,
            max_concurrency: 3,
        }
    }
}

impl PipelineConfig {
    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.max_concurrency == 0 {
            return Err(ValidationError::config("max_concurrency must be at least 1").into());
        }
        if self.max_batch_size == 0 {
            return Err(ValidationError::config("max_batch_size must be at least 1").into());
        }
        if self.output_ceiling_bytes == 0 {
            return Err(ValidationError::config("output_ceiling_bytes must be non-zero").into());
        }
        if self.preset_large.width == 0
            || self.preset_large.height == 0
            || self.preset_small.width == 0
            || self.preset_small.height == 0
        {
            return Err(ValidationError::config("presets must have non-zero dimensions").into());
        }
        Ok(())
    }
}
