//! Synthetic images for pipeline tests.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Image where every pixel has a distinct colour, so any flip or rotation
/// shows up in a pixel-by-pixel comparison.
pub fn pattern(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 40 % 256) as u8, (y * 40 % 256) as u8, ((x + y * width) % 256) as u8])
    })
}

/// Baseline JPEG without any EXIF block.
pub fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = pattern(width, height);
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
    encoder
        .encode(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// PNG of the test pattern.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    pattern(width, height)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// A complete APP1 segment (marker included) holding a one-entry IFD0 with
/// the orientation tag.
pub fn exif_app1(orientation: u16, little_endian: bool) -> Vec<u8> {
    let u16_bytes = |v: u16| {
        if little_endian {
            v.to_le_bytes()
        } else {
            v.to_be_bytes()
        }
    };
    let u32_bytes = |v: u32| {
        if little_endian {
            v.to_le_bytes()
        } else {
            v.to_be_bytes()
        }
    };

    let mut tiff = Vec::new();
    tiff.extend_from_slice(if little_endian { b"II" } else { b"MM" });
    tiff.extend_from_slice(&u16_bytes(0x002A));
    tiff.extend_from_slice(&u32_bytes(8));
    // IFD0: one entry, SHORT, count 1, value left-justified
    tiff.extend_from_slice(&u16_bytes(1));
    tiff.extend_from_slice(&u16_bytes(0x0112));
    tiff.extend_from_slice(&u16_bytes(3));
    tiff.extend_from_slice(&u32_bytes(1));
    tiff.extend_from_slice(&u16_bytes(orientation));
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&u32_bytes(0));

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}

/// A little-endian APP1 segment whose IFD0 carries Make, Orientation and
/// DateTime, the way a phone camera writes them.
pub fn capture_app1(orientation: u16, make: &str, datetime: &str) -> Vec<u8> {
    const ASCII: u16 = 2;
    const SHORT: u16 = 3;
    const ENTRIES: u16 = 3;

    let mut make_value = make.as_bytes().to_vec();
    make_value.push(0);
    let mut datetime_value = datetime.as_bytes().to_vec();
    datetime_value.push(0);

    // Header, then IFD0 (count, entries, next-IFD offset), then string data
    let data_start = 8 + 2 + ENTRIES as u32 * 12 + 4;
    let make_offset = data_start;
    let datetime_offset = make_offset + make_value.len() as u32;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&0x002Au16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&ENTRIES.to_le_bytes());

    let mut entry = |tag: u16, kind: u16, count: u32, value: [u8; 4]| {
        tiff.extend_from_slice(&tag.to_le_bytes());
        tiff.extend_from_slice(&kind.to_le_bytes());
        tiff.extend_from_slice(&count.to_le_bytes());
        tiff.extend_from_slice(&value);
    };
    // Entries sorted by tag
    entry(0x010F, ASCII, make_value.len() as u32, make_offset.to_le_bytes());
    let [lo, hi] = orientation.to_le_bytes();
    entry(0x0112, SHORT, 1, [lo, hi, 0, 0]);
    entry(0x0132, ASCII, datetime_value.len() as u32, datetime_offset.to_le_bytes());

    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(&make_value);
    tiff.extend_from_slice(&datetime_value);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}

/// JPEG of the test pattern with orientation, camera make and capture time.
pub fn exif_jpeg_with_capture(
    width: u32,
    height: u32,
    orientation: u16,
    make: &str,
    datetime: &str,
) -> Vec<u8> {
    with_app1(&plain_jpeg(width, height), &capture_app1(orientation, make, datetime))
}

/// Insert a marker segment directly after the SOI marker of a JPEG.
pub fn with_app1(jpeg: &[u8], segment: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(jpeg.len() + segment.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// JPEG of the test pattern tagged with the given EXIF orientation.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    with_app1(&plain_jpeg(width, height), &exif_app1(orientation, true))
}

/// Reference EXIF-aware rendering built from the `image` crate's own
/// flip/rotate primitives.
pub fn reference_orient(img: &RgbImage, tag: u16) -> RgbImage {
    use image::imageops::{flip_horizontal, flip_vertical, rotate180, rotate270, rotate90};
    match tag {
        2 => flip_horizontal(img),
        3 => rotate180(img),
        4 => flip_vertical(img),
        5 => flip_horizontal(&rotate90(img)),
        6 => rotate90(img),
        7 => flip_horizontal(&rotate270(img)),
        8 => rotate270(img),
        _ => img.clone(),
    }
}
