//! Input and output types of the receipt optimization pipeline.

use std::path::Path;
use std::sync::Arc;

use crate::pipeline::Orientation;

/// Media type of everything the pipeline emits.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Prefix added to a receipt's file name to name its thumbnail.
pub const THUMBNAIL_PREFIX: &str = "thumb_";

/// A receipt photo as picked by the user: raw bytes, declared media type and
/// original file name. Cloning shares the byte buffer.
#[derive(Debug, Clone)]
pub struct SourceImage {
    data: Arc<[u8]>,
    media_type: String,
    name: String,
}

impl SourceImage {
    /// Create a source image from raw bytes.
    pub fn new(
        data: impl Into<Arc<[u8]>>,
        media_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
            name: name.into(),
        }
    }

    /// Read a source image from disk, declaring its media type from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("receipt")
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        Ok(Self::new(data, media_type_for_extension(&extension), name))
    }

    /// Raw file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the raw file bytes.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Declared media type (e.g. "image/png").
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the raw file in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the file has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Map a file extension to the media type declared for it.
pub fn media_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// An encoded image blob with its declared type and file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Compressed image bytes
    pub data: Vec<u8>,
    /// Always [`JPEG_MEDIA_TYPE`] for pipeline output
    pub media_type: String,
    /// File name the blob is offered under
    pub name: String,
}

impl EncodedImage {
    /// Wrap JPEG bytes under the given file name.
    pub fn jpeg(data: Vec<u8>, name: impl Into<String>) -> Self {
        Self {
            data,
            media_type: JPEG_MEDIA_TYPE.to_string(),
            name: name.into(),
        }
    }

    /// Size of the encoded blob in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Result of optimizing one receipt photo.
///
/// Built once per call and handed to the caller; the pipeline never touches
/// it again.
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    /// Orientation-corrected, bounded, re-encoded image
    pub full: EncodedImage,
    /// Width of the full image in pixels
    pub width: u32,
    /// Height of the full image in pixels
    pub height: u32,
    /// Reduced copy of the full image, when thumbnails are enabled
    pub thumbnail: Option<EncodedImage>,
    /// EXIF orientation that was corrected
    pub orientation: Orientation,
}
