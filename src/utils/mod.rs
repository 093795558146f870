pub mod bytes;
pub mod error;
pub mod formats;

pub use bytes::format_bytes;
pub use error::{OptimizerError, OptimizerResult, PipelineError, PipelineResult, ValidationError};
pub use formats::{ImageFormat, format_from_extension};
