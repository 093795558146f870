// Module declarations in dependency order
pub mod core;
pub mod display;
pub mod export;
pub mod processing;
pub mod utils;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

// Public exports for external consumers
pub use crate::core::{
    BatchEvent, BatchProgress, EncodedResult, PipelineConfig, Preset, SourceImage, TaskId,
    TaskSnapshot, TaskStatus,
};
pub use crate::display::{DisplayHandle, DisplaySlot, HandleRegistry, ViewMode};
pub use crate::utils::{ImageFormat, OptimizerError, OptimizerResult};
pub use crate::worker::{BatchHandle, ThumbnailOptimizer};

// This library file is the public API for consuming the pipeline as a crate.
// The CLI entry point is in main.rs.
