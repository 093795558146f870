//! Error types for the thumbnail optimizer.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use thiserror::Error;
use serde::Serialize;

/// Validation errors for submitted files and configuration.
///
/// All of these are detected synchronously, before a file is queued, so a
/// file failing validation never occupies a worker slot.
#[derive(Error, Debug, Clone, Serialize)]
pub enum ValidationError {
    /// The MIME type is not on the allow-list
    #[error("unsupported format: {0} (png and jpeg only)")]
    UnsupportedFormat(String),
    /// The upload exceeds the configured input ceiling
    #[error("file is too large: {size} bytes exceeds the {limit} byte upload limit")]
    TooLarge { size: u64, limit: u64 },
    /// The upload contains no bytes at all
    #[error("file is empty")]
    Empty,
    /// A batch submission contained no files
    #[error("no files were submitted")]
    EmptyBatch,
    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),
}

/// Per-task pipeline failures.
///
/// Each variant maps to a distinct user-facing failure class so the caller
/// can tell "this image could not be opened" apart from "this image could
/// not be compressed enough".
#[derive(Error, Debug, Clone, Serialize)]
pub enum PipelineError {
    /// The image bytes could not be decoded into pixels. Covers corrupt
    /// files, truncated data, and zero-dimension sources.
    #[error("could not open this image: {0}")]
    Decode(String),

    /// The output ceiling is unreachable even at minimum acceptable quality.
    #[error("could not compress below {ceiling} bytes without unacceptable quality loss")]
    CompressionLimit { ceiling: u64 },

    /// Catch-all for unexpected pipeline failures
    #[error("processing error: {0}")]
    Processing(String),
}

/// Main error type for the optimizer.
///
/// Per-task errors are converted to a terminal task state by the
/// orchestrator and never propagate out of a batch; this type surfaces only
/// from the public API itself (contract violations, export I/O).
#[derive(Error, Debug, Serialize)]
pub enum OptimizerError {
    /// File or batch validation failed
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A pipeline stage failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Download/export packaging error
    #[error("export error: {0}")]
    Export(String),
}

/// Convenience result type for optimizer operations.
pub type OptimizerResult<T> = Result<T, OptimizerError>;

/// Convenience result type for pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineError>;

// Helper methods for error creation
impl PipelineError {
    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn processing<T: Into<String>>(msg: T) -> Self {
        Self::Processing(msg.into())
    }

    pub fn compression_limit(ceiling: u64) -> Self {
        Self::CompressionLimit { ceiling }
    }
}

impl OptimizerError {
    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::IO(msg.into())
    }

    pub fn export<T: Into<String>>(msg: T) -> Self {
        Self::Export(msg.into())
    }
}

impl ValidationError {
    pub fn unsupported_format(mime: impl Into<String>) -> Self {
        Self::UnsupportedFormat(mime.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

// Convert std::io::Error to OptimizerError
impl From<io::Error> for OptimizerError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}
