//! Input validation before decoding.

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::SourceImage;

/// Validates sources before they reach the decoder.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Quick checks that avoid a pointless decode.
    ///
    /// Checks:
    /// - Source is within the size limit
    /// - Source starts with a known image signature
    pub fn validate(&self, source: &SourceImage) -> Result<(), PipelineError> {
        self.check_size(source.name(), source.len() as u64)?;

        if !Self::is_valid_image_header(source.bytes()) {
            return Err(PipelineError::Decode {
                name: source.name().to_string(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    /// Check a byte count against the file size limit. Callers reading from
    /// disk run this on the file's metadata before loading it.
    pub fn check_size(&self, name: &str, size: u64) -> Result<(), PipelineError> {
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if size > max_bytes {
            return Err(PipelineError::FileTooLarge {
                name: name.to_string(),
                size_mb: size / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Check if the leading bytes match a format the decoder is built with.
    fn is_valid_image_header(header: &[u8]) -> bool {
        match header {
            // JPEG
            [0xFF, 0xD8, 0xFF, ..] => true,
            // PNG
            [0x89, b'P', b'N', b'G', ..] => true,
            // GIF
            [b'G', b'I', b'F', b'8', ..] => true,
            // WebP: RIFF....WEBP
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => true,
            // BMP
            [b'B', b'M', _, _, ..] => true,
            _ => false,
        }
    }
}
