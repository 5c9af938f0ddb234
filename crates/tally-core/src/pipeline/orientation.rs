//! EXIF orientation reader.
//!
//! Walks JPEG marker segments looking for the APP1/EXIF block and pulls the
//! Orientation (0x0112) entry out of IFD0. Anything unexpected degrades to
//! [`Orientation::Normal`]; this reader never fails.

use serde::{Deserialize, Serialize};

const SOI: u16 = 0xFFD8;
const APP1: u16 = 0xFFE1;
const EXIF_SIGNATURE: &[u8; 6] = b"Exif\0\0";
const TIFF_MAGIC: u16 = 0x002A;
const ORIENTATION_TAG: u16 = 0x0112;
const IFD_ENTRY_LEN: usize = 12;

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (mirror across the top-left to bottom-right diagonal).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (mirror across the top-right to bottom-left diagonal).
    Transverse = 7,
    /// Rotate 90 degrees counter-clockwise.
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if this orientation swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// The raw EXIF tag value.
    pub fn tag(self) -> u16 {
        self as u16
    }
}

impl From<u16> for Orientation {
    fn from(value: u16) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

fn read_u16(bytes: &[u8], offset: usize, order: ByteOrder) -> Option<u16> {
    let raw: [u8; 2] = bytes.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
    Some(match order {
        ByteOrder::Little => u16::from_le_bytes(raw),
        ByteOrder::Big => u16::from_be_bytes(raw),
    })
}

fn read_u32(bytes: &[u8], offset: usize, order: ByteOrder) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
    Some(match order {
        ByteOrder::Little => u32::from_le_bytes(raw),
        ByteOrder::Big => u32::from_be_bytes(raw),
    })
}

/// Orientation value from the payload of an APP1 segment (the bytes after
/// its length field), if it is an EXIF block carrying one.
fn parse_app1(payload: &[u8]) -> Option<u16> {
    let tiff = payload.strip_prefix(EXIF_SIGNATURE.as_slice())?;
    let (order, ifd) = tiff_header(tiff)?;
    find_orientation(tiff, order, ifd)
}

/// Byte order and IFD0 offset of a TIFF block.
fn tiff_header(tiff: &[u8]) -> Option<(ByteOrder, usize)> {
    let order = match tiff.get(0..2)? {
        b"II" => ByteOrder::Little,
        b"MM" => ByteOrder::Big,
        _ => return None,
    };
    if read_u16(tiff, 2, order)? != TIFF_MAGIC {
        return None;
    }
    Some((order, read_u32(tiff, 4, order)? as usize))
}

/// Find the orientation entry in the IFD at `ifd`. A truncated directory
/// is searched as far as it goes.
fn find_orientation(tiff: &[u8], order: ByteOrder, ifd: usize) -> Option<u16> {
    let count = read_u16(tiff, ifd, order)? as usize;
    let entries = ifd.checked_add(2)?;

    (0..count)
        .map(|i| entries + i * IFD_ENTRY_LEN)
        .take_while(|&entry| entry + IFD_ENTRY_LEN <= tiff.len())
        .find(|&entry| read_u16(tiff, entry, order) == Some(ORIENTATION_TAG))
        .and_then(|entry| read_u16(tiff, entry + 8, order))
}

/// Read the EXIF orientation of an image file.
///
/// Non-JPEG input, a missing or truncated EXIF block, and out-of-range values
/// all resolve to [`Orientation::Normal`]. APP1 segments that yield no
/// orientation entry are skipped; the first one that does decides the result.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    if read_u16(bytes, 0, ByteOrder::Big) != Some(SOI) {
        return Orientation::Normal;
    }

    let mut offset = 2;
    while let Some(marker) = read_u16(bytes, offset, ByteOrder::Big) {
        offset += 2;
        if marker & 0xFF00 != 0xFF00 {
            break;
        }
        let Some(length) = read_u16(bytes, offset, ByteOrder::Big) else {
            break;
        };
        let length = length as usize;
        if length < 2 {
            tracing::trace!(offset, "Segment length below minimum, stopping EXIF scan");
            break;
        }

        if marker == APP1 {
            let end = (offset + length).min(bytes.len());
            let payload = bytes.get(offset + 2..end).unwrap_or_default();
            if let Some(value) = parse_app1(payload) {
                return Orientation::from(value);
            }
            tracing::trace!(offset, "APP1 segment without orientation, continuing scan");
        }
        offset += length;
    }

    Orientation::Normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::{exif_app1, jpeg_with_orientation, plain_jpeg, png_bytes, with_app1};

    #[test]
    fn test_orientation_from_u16() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(0), Orientation::Normal);
        assert_eq!(Orientation::from(99), Orientation::Normal);
    }

    #[test]
    fn test_orientation_swaps_dimensions() {
        for tag in 1..=4u16 {
            assert!(!Orientation::from(tag).swaps_dimensions(), "tag {tag}");
        }
        for tag in 5..=8u16 {
            assert!(Orientation::from(tag).swaps_dimensions(), "tag {tag}");
        }
    }

    #[test]
    fn test_reads_every_tag_both_byte_orders() {
        for tag in 1..=8u16 {
            for little_endian in [true, false] {
                let jpeg = with_app1(&plain_jpeg(4, 2), &exif_app1(tag, little_endian));
                assert_eq!(read_orientation(&jpeg).tag(), tag, "tag {tag} le={little_endian}");
            }
        }
    }

    #[test]
    fn test_plain_jpeg_is_normal() {
        assert_eq!(read_orientation(&plain_jpeg(4, 4)), Orientation::Normal);
    }

    #[test]
    fn test_png_is_normal() {
        assert_eq!(read_orientation(&png_bytes(8, 8)), Orientation::Normal);
    }

    #[test]
    fn test_empty_and_tiny_inputs() {
        assert_eq!(read_orientation(&[]), Orientation::Normal);
        assert_eq!(read_orientation(&[0xFF]), Orientation::Normal);
        assert_eq!(read_orientation(&[0xFF, 0xD8]), Orientation::Normal);
    }

    #[test]
    fn test_truncated_exif_segment() {
        let jpeg = jpeg_with_orientation(4, 4, 6);
        // SOI + APP1 marker + length + "Exif\0\0" + part of the TIFF header
        for cut in [4, 6, 10, 14, 20, 28] {
            assert_eq!(read_orientation(&jpeg[..cut]), Orientation::Normal, "cut {cut}");
        }
    }

    #[test]
    fn test_bad_tiff_header_is_normal() {
        let mut segment = exif_app1(6, true);
        // Corrupt the byte-order mark
        segment[10] = b'X';
        segment[11] = b'X';
        let jpeg = with_app1(&plain_jpeg(4, 4), &segment);
        assert_eq!(read_orientation(&jpeg), Orientation::Normal);
    }

    #[test]
    fn test_bad_tiff_header_is_skipped() {
        let mut broken = exif_app1(3, true);
        broken[12] = 0x00;
        let base = plain_jpeg(4, 4);
        let jpeg = with_app1(&with_app1(&base, &exif_app1(6, false)), &broken);
        assert_eq!(read_orientation(&jpeg), Orientation::Rotate90CW);
    }

    #[test]
    fn test_exif_without_tag_is_skipped() {
        let mut untagged = exif_app1(6, true);
        // Rename the only IFD0 entry from 0x0112 to 0x0110 (Model)
        untagged[20] = 0x10;
        let base = plain_jpeg(4, 4);
        assert_eq!(read_orientation(&with_app1(&base, &untagged)), Orientation::Normal);

        let jpeg = with_app1(&with_app1(&base, &exif_app1(8, true)), &untagged);
        assert_eq!(read_orientation(&jpeg), Orientation::Rotate270CW);
    }

    #[test]
    fn test_out_of_range_value_is_normal() {
        let jpeg = with_app1(&plain_jpeg(4, 4), &exif_app1(42, false));
        assert_eq!(read_orientation(&jpeg), Orientation::Normal);
    }

    #[test]
    fn test_skips_non_exif_app1() {
        let mut xmp = vec![0xFF, 0xE1, 0x00, 0x0A];
        xmp.extend_from_slice(b"http://");
        xmp.push(0);
        let base = plain_jpeg(4, 4);
        let with_exif = with_app1(&base, &exif_app1(8, true));
        let jpeg = with_app1(&with_exif, &xmp);
        assert_eq!(read_orientation(&jpeg), Orientation::Rotate270CW);
    }

    #[test]
    fn test_first_exif_segment_wins() {
        let base = plain_jpeg(4, 4);
        let second = with_app1(&base, &exif_app1(3, true));
        let jpeg = with_app1(&second, &exif_app1(6, true));
        assert_eq!(read_orientation(&jpeg), Orientation::Rotate90CW);
    }

    #[test]
    fn test_non_marker_stops_scan() {
        let mut jpeg = vec![0xFF, 0xD8, 0x12, 0x34];
        jpeg.extend_from_slice(&exif_app1(6, true));
        assert_eq!(read_orientation(&jpeg), Orientation::Normal);
    }
}
