//! Core types for submitted images and encoded results.

use std::sync::Arc;

use serde::Serialize;

use crate::utils::ImageFormat;

/// A raw image file as submitted by the caller.
///
/// Immutable for the lifetime of its task. The byte size of this upload is
/// the reference point for every compression ratio the pipeline reports.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Original file name, used to derive output names
    pub file_name: String,
    /// MIME type as reported by the caller (validated against the allow-list)
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Arc<Vec<u8>>,
}

impl SourceImage {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// The encoded output of a completed task.
///
/// `compression_ratio` is the fraction of the *original upload* saved:
/// `(original_bytes - byte_size) / original_bytes`. It is never computed
/// against the lossless intermediate, which is typically larger than the
/// upload and would report misleading zero or negative savings. Negative
/// values (output grew) are reported as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedResult {
    /// Encoded image bytes
    #[serde(skip)]
    pub bytes: Arc<Vec<u8>>,
    /// Format actually produced (PNG fast path or JPEG re-encode)
    pub format: ImageFormat,
    /// Output size in bytes, always at or below the configured ceiling
    pub byte_size: u64,
    /// Fraction of the original upload saved (may be negative)
    pub compression_ratio: f64,
}

impl EncodedResult {
    /// Builds a result, deriving size and ratio from the given original
    /// upload size.
    pub fn new(bytes: Vec<u8>, format: ImageFormat, original_bytes: u64) -> Self {
        let byte_size = bytes.len() as u64;
        let compression_ratio = if original_bytes > 0 {
            (original_bytes as f64 - byte_size as f64) / original_bytes as f64
        } else {
            0.0
        };
        Self {
            bytes: Arc::new(bytes),
            format,
            byte_size,
            compression_ratio,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}
