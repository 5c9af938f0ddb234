//! Capture metadata from receipt photos.

use exif::{In, Reader, Tag};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Camera-reported details worth keeping alongside a receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureInfo {
    /// When the photo was taken, as written by the camera
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,

    /// Camera manufacturer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_make: Option<String>,

    /// Camera model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
}

/// Extracts capture metadata from image bytes.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract capture info from an image file's bytes.
    ///
    /// Returns `None` if the file has no EXIF data, extraction fails, or none
    /// of the fields are present.
    pub fn extract(bytes: &[u8]) -> Option<CaptureInfo> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .ok()?;

        let info = CaptureInfo {
            captured_at: Self::get_datetime(&exif),
            camera_make: Self::get_string(&exif, Tag::Make),
            camera_model: Self::get_string(&exif, Tag::Model),
        };

        if info == CaptureInfo::default() {
            None
        } else {
            Some(info)
        }
    }

    fn get_string(exif: &exif::Exif, tag: Tag) -> Option<String> {
        exif.get_field(tag, In::PRIMARY).map(|f| {
            let s = f.display_value().to_string();
            s.trim_matches('"').to_string()
        })
    }

    /// Prefer DateTimeOriginal over DateTime.
    fn get_datetime(exif: &exif::Exif) -> Option<String> {
        exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))
            .map(|f| f.display_value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::{exif_jpeg_with_capture, jpeg_with_orientation, png_bytes};
    use crate::pipeline::read_orientation;

    #[test]
    fn test_extract_without_exif() {
        assert!(MetadataExtractor::extract(&png_bytes(4, 4)).is_none());
        assert!(MetadataExtractor::extract(&[0x00, 0x01]).is_none());
    }

    #[test]
    fn test_orientation_only_exif_has_no_capture_info() {
        let jpeg = jpeg_with_orientation(4, 4, 6);
        assert!(MetadataExtractor::extract(&jpeg).is_none());
    }

    #[test]
    fn test_extract_make_and_capture_time() {
        let jpeg = exif_jpeg_with_capture(16, 8, 3, "Canon", "2024:03:05 12:34:56");
        let info = MetadataExtractor::extract(&jpeg).unwrap();
        assert_eq!(
            info,
            CaptureInfo {
                captured_at: Some("2024-03-05 12:34:56".to_string()),
                camera_make: Some("Canon".to_string()),
                camera_model: None,
            }
        );
        // The capture entries sit beside the orientation entry in IFD0
        assert_eq!(read_orientation(&jpeg).tag(), 3);
    }
}
