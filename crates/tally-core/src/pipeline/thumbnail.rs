//! Thumbnail generation from the corrected full-size raster.

use image::RgbImage;

use crate::config::ThumbnailConfig;
use crate::error::PipelineResult;
use crate::types::{EncodedImage, THUMBNAIL_PREFIX};

use super::encode::encode_jpeg;
use super::render::{RasterBounds, Renderer};

/// Generates JPEG thumbnails.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
    renderer: Renderer,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    pub fn new(config: ThumbnailConfig, renderer: Renderer) -> Self {
        Self { config, renderer }
    }

    /// Largest thumbnail size allowed.
    pub fn bound(&self) -> RasterBounds {
        RasterBounds::new(self.config.max_width, self.config.max_height)
    }

    /// Render and encode a thumbnail of `full`, which must already be
    /// orientation-corrected; its size, not the source's, drives the scale.
    ///
    /// Returns `Ok(None)` if thumbnails are disabled.
    pub fn generate(&self, name: &str, full: &RgbImage) -> PipelineResult<Option<EncodedImage>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let thumb_name = format!("{THUMBNAIL_PREFIX}{name}");
        let raster = self.renderer.render_fitted(&thumb_name, full, self.bound())?;
        let data = encode_jpeg(&thumb_name, &raster, self.config.quality)?;
        Ok(Some(EncodedImage::jpeg(data, thumb_name)))
    }

    /// Check if thumbnail generation is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::pattern;

    fn generator(enabled: bool) -> ThumbnailGenerator {
        let config = ThumbnailConfig {
            enabled,
            ..ThumbnailConfig::default()
        };
        ThumbnailGenerator::new(config, Renderer::new(1 << 24))
    }

    #[test]
    fn test_thumbnail_generation() {
        let thumb = generator(true)
            .generate("lunch.jpg", &pattern(1000, 500))
            .unwrap()
            .unwrap();
        assert_eq!(thumb.name, "thumb_lunch.jpg");
        assert_eq!(thumb.media_type, "image/jpeg");

        let decoded = image::load_from_memory(&thumb.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }

    #[test]
    fn test_thumbnail_disabled() {
        let thumbs = generator(false);
        assert!(!thumbs.is_enabled());
        assert!(thumbs.generate("x.jpg", &pattern(300, 300)).unwrap().is_none());
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let thumb = generator(true)
            .generate("tiny.jpg", &pattern(50, 80))
            .unwrap()
            .unwrap();
        let decoded = image::load_from_memory(&thumb.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 80));
    }
}
