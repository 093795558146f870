use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::ValidationError;

/// The raster formats the pipeline accepts as input and emits as output.
///
/// The upload allow-list is deliberately narrow: thumbnails arrive as PNG or
/// JPEG and leave as PNG (lossless fast path) or JPEG (size-constrained
/// re-encode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Get the canonical MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Parse a MIME type string, accepting the legacy `image/jpg` alias.
    pub fn from_mime(mime: &str) -> Result<Self, ValidationError> {
        match mime.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            other => Err(ValidationError::unsupported_format(other)),
        }
    }

    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
        }
    }

    /// Check if the extension matches this format
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }

    /// Get the primary extension for this format
    pub fn primary_extension(&self) -> &str {
        self.extensions()[0]
    }
}

impl FromStr for ImageFormat {
    type Err = ValidationError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(ValidationError::unsupported_format(ext)),
        }
    }
}

/// Get format from a file's extension
pub fn format_from_extension(path: &str) -> Result<ImageFormat, ValidationError> {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ValidationError::unsupported_format("file has no extension"))?;

    ImageFormat::from_str(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_aliases_resolve_to_jpeg() {
        assert_eq!(ImageFormat::from_mime("image/jpeg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_mime("image/jpg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_mime("IMAGE/PNG").unwrap(), ImageFormat::Png);
    }

    #[test]
    fn unlisted_mime_is_rejected() {
        assert!(ImageFormat::from_mime("image/webp").is_err());
        assert!(ImageFormat::from_mime("application/pdf").is_err());
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(format_from_extension("shot.PNG").unwrap(), ImageFormat::Png);
        assert_eq!(format_from_extension("dir/a.jpeg").unwrap(), ImageFormat::Jpeg);
        assert!(format_from_extension("notes.txt").is_err());
        assert!(format_from_extension("noext").is_err());
    }

    #[test]
    fn primary_extension_is_stable() {
        assert_eq!(ImageFormat::Jpeg.primary_extension(), "jpg");
        assert_eq!(ImageFormat::Png.primary_extension(), "png");
        assert!(ImageFormat::Jpeg.matches_extension("JPEG"));
    }
}
