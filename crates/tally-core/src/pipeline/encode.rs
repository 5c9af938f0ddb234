//! JPEG re-encoding of rendered rasters.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};

use crate::error::{PipelineError, PipelineResult};

/// Encode a raster as baseline JPEG at `quality` (1-100).
///
/// An empty raster, an encoder error or an empty buffer is reported as
/// [`PipelineError::Encode`]; there is no fallback format.
pub fn encode_jpeg(name: &str, raster: &RgbImage, quality: u8) -> PipelineResult<Vec<u8>> {
    let encode_error = |message: String| PipelineError::Encode {
        name: name.to_string(),
        message,
    };

    if raster.width() == 0 || raster.height() == 0 {
        return Err(encode_error("raster has no pixels".to_string()));
    }

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| encode_error(e.to_string()))?;

    if buf.is_empty() {
        return Err(encode_error("encoder produced no data".to_string()));
    }
    tracing::trace!(
        "Encoded {name}: {}x{} q{quality} -> {} bytes",
        raster.width(),
        raster.height(),
        buf.len()
    );
    Ok(buf)
}
