//! Image decoding with format detection and dimension limits.

use image::{GenericImageView, ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

use super::handle::SourceHandle;

/// Image decoder with configurable limits.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding a receipt photo.
#[derive(Debug)]
pub struct DecodedImage {
    /// Decoded pixels in the file's stored (un-oriented) layout
    pub image: RgbImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Intrinsic width in pixels
    pub width: u32,
    /// Intrinsic height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode the buffer behind `handle` on the blocking pool.
    pub async fn decode(&self, handle: &SourceHandle) -> Result<DecodedImage, PipelineError> {
        let bytes = handle.shared();
        let name = handle.name().to_string();
        let max_dim = self.limits.max_image_dimension;

        tokio::task::spawn_blocking(move || Self::decode_bytes_sync(&bytes, &name, max_dim))
            .await
            .map_err(|e| PipelineError::Decode {
                name: handle.name().to_string(),
                message: format!("Task join error: {}", e),
            })?
    }

    /// Synchronous decode (runs in spawn_blocking).
    fn decode_bytes_sync(
        bytes: &Arc<[u8]>,
        name: &str,
        max_dim: u32,
    ) -> Result<DecodedImage, PipelineError> {
        let decode_error = |message: String| PipelineError::Decode {
            name: name.to_string(),
            message,
        };

        let reader = image::ImageReader::new(Cursor::new(&bytes[..]))
            .with_guessed_format()
            .map_err(|e| decode_error(format!("Cannot detect image format: {}", e)))?;
        let format = reader
            .format()
            .ok_or_else(|| decode_error("Unrecognized image format".to_string()))?;

        // Checked before the full decode so oversized inputs never allocate.
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| decode_error(e.to_string()))?;
        if width > max_dim || height > max_dim {
            return Err(decode_error(format!(
                "Image too large ({}x{} > {})",
                width, height, max_dim
            )));
        }

        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| decode_error(e.to_string()))?;
        let (width, height) = image.dimensions();
        tracing::trace!("Decoded {name}: {}x{} {:?}", width, height, format);

        Ok(DecodedImage {
            image: image.into_rgb8(),
            format,
            width,
            height,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        _ => "unknown".to_string(),
    }
}
