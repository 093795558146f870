//! Download helpers: single-item save and bulk archive packaging.
//!
//! Output names are always derived from the MIME type of the bytes actually
//! being written, never from a user-facing format label. A JPEG blob saved
//! under a `.png` name is a broken file; this module makes that mistake
//! unrepresentable.

use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use tracing::debug;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::core::{EncodedResult, TaskSnapshot, TaskStatus};
use crate::utils::{ImageFormat, OptimizerError, OptimizerResult};

/// JPEG quality used when a download is converted away from its encoded
/// format on request.
const CONVERSION_JPEG_QUALITY: u8 = 92;

/// Builds the output file name for an encoded blob:
/// `<stem>-optimized.<ext>`, with the extension taken from the format of
/// the actual content.
pub fn output_file_name(original_name: &str, format: ImageFormat) -> String {
    let stem = original_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(original_name);
    format!("{stem}-optimized.{}", format.primary_extension())
}

/// Saves one completed item into `dir`, converting to `requested` when it
/// differs from the encoded format.
///
/// When the encoded blob already has the requested format it is written
/// verbatim. Otherwise the blob is re-encoded so that the file's content
/// matches the extension it is given.
pub fn save_item(
    item: &TaskSnapshot,
    dir: &Path,
    requested: ImageFormat,
) -> OptimizerResult<PathBuf> {
    let encoded = item
        .encoded
        .as_ref()
        .ok_or_else(|| OptimizerError::export("item has no encoded output"))?;

    let (bytes, format) = if encoded.format == requested {
        (encoded.bytes.as_ref().clone(), encoded.format)
    } else {
        debug!(
            "converting '{}' from {} to {} for download",
            item.file_name,
            encoded.mime_type(),
            requested.mime_type()
        );
        (convert(&encoded.bytes, requested)?, requested)
    };

    let path = dir.join(output_file_name(&item.file_name, format));
    std::fs::write(&path, &bytes)?;
    Ok(path)
}

/// Packages every `Done` item into a ZIP archive written to `writer`.
///
/// Entries are stored uncompressed (the blobs are already compressed
/// images). Entry extensions follow each blob's encoded format. Returns the
/// number of entries written; packaging an archive with nothing completed is
/// an error.
pub fn write_archive<W: Write + Seek>(
    items: &[TaskSnapshot],
    writer: W,
) -> OptimizerResult<usize> {
    let completed: Vec<(&TaskSnapshot, &EncodedResult)> = items
        .iter()
        .filter(|item| item.status == TaskStatus::Done)
        .filter_map(|item| item.encoded.as_ref().map(|encoded| (item, encoded)))
        .collect();
    if completed.is_empty() {
        return Err(OptimizerError::export("no completed items to package"));
    }

    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (item, encoded) in &completed {
        let name = output_file_name(&item.file_name, encoded.format);
        zip.start_file(name, options)
            .map_err(|e| OptimizerError::export(e.to_string()))?;
        zip.write_all(&encoded.bytes)?;
    }

    zip.finish().map_err(|e| OptimizerError::export(e.to_string()))?;
    debug!("packaged {} items into archive", completed.len());
    Ok(completed.len())
}

/// Re-encodes a blob into `target`. Lossless for PNG output; JPEG output
/// uses a fixed high quality since this path is a format conversion, not a
/// size-constrained optimization.
fn convert(bytes: &[u8], target: ImageFormat) -> OptimizerResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| OptimizerError::export(format!("could not re-open blob: {e}")))?;

    let mut out = Vec::new();
    match target {
        ImageFormat::Png => {
            decoded
                .to_rgb8()
                .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
                .map_err(|e| OptimizerError::export(format!("PNG encode failed: {e}")))?;
        }
        ImageFormat::Jpeg => {
            let rgb = decoded.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut out, CONVERSION_JPEG_QUALITY);
            encoder
                .encode(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| OptimizerError::export(format!("JPEG encode failed: {e}")))?;
        }
    }
    Ok(out)
}
