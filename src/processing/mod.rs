//! The image pipeline stages.
//!
//! - [`geometry`]: source dimensions to canvas, scale and crop placement
//! - [`renderer`]: decode plus lossless scale-and-crop onto the canvas
//! - [`encoder`]: size-constrained final encode under the byte ceiling
//! - [`validation`]: pre-queue checks on submitted files
//! - [`pipeline`]: the stages composed for one task

pub mod encoder;
pub mod geometry;
pub mod pipeline;
pub mod renderer;
pub mod validation;

pub use geometry::GeometryPlan;
pub use pipeline::{PipelineOutcome, process};
pub use renderer::RenderedImage;
pub use validation::validate_source;
