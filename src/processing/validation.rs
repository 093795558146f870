use crate::core::{PipelineConfig, SourceImage};
use crate::utils::{ImageFormat, ValidationError};

/// Validates a submitted file before it is allowed into the queue.
///
/// Runs synchronously at submission time; a file failing here is marked as
/// failed immediately and never occupies a worker slot. The upload ceiling
/// is independent of the output ceiling: it guards memory use during
/// processing, not the final file size.
pub fn validate_source(
    source: &SourceImage,
    config: &PipelineConfig,
) -> Result<(), ValidationError> {
    if source.bytes.is_empty() {
        return Err(ValidationError::Empty);
    }

    ImageFormat::from_mime(&source.mime_type)?;

    if source.byte_size() > config.upload_ceiling_bytes {
        return Err(ValidationError::TooLarge {
            size: source.byte_size(),
            limit: config.upload_ceiling_bytes,
        });
    }

    Ok(())
}
