//! Bounded, orientation-corrected rendering onto a [`Surface`].

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

use super::orientation::Orientation;
use super::surface::{Surface, SurfaceError, Transform};

/// A pixel size. Both axes are at least 1 for anything the renderer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterBounds {
    pub width: u32,
    pub height: u32,
}

impl RasterBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height exchanged.
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Scale down (never up) to fit inside `max`, preserving aspect ratio.
    ///
    /// `scale = min(1, max.width / width, max.height / height)`; each axis is
    /// `round(axis * scale)`, rounding half away from zero, kept within
    /// `1..=max`.
    pub fn fit_within(self, max: RasterBounds) -> Self {
        if self.width == 0 || self.height == 0 {
            return self;
        }
        let scale = (max.width as f64 / self.width as f64)
            .min(max.height as f64 / self.height as f64)
            .min(1.0);
        if scale >= 1.0 {
            return self;
        }
        let scaled = |axis: u32, limit: u32| ((axis as f64 * scale).round() as u32).clamp(1, limit);
        Self::new(
            scaled(self.width, max.width),
            scaled(self.height, max.height),
        )
    }
}

/// Canvas matrix that lays a `width x height` drawing out with the given
/// EXIF orientation honoured. `None` for [`Orientation::Normal`].
pub fn orientation_transform(orientation: Orientation, width: f64, height: f64) -> Option<Transform> {
    let (w, h) = (width, height);
    let m = match orientation {
        Orientation::Normal => return None,
        Orientation::FlipHorizontal => Transform::new(-1.0, 0.0, 0.0, 1.0, w, 0.0),
        Orientation::Rotate180 => Transform::new(-1.0, 0.0, 0.0, -1.0, w, h),
        Orientation::FlipVertical => Transform::new(1.0, 0.0, 0.0, -1.0, 0.0, h),
        Orientation::Transpose => Transform::new(0.0, 1.0, 1.0, 0.0, 0.0, 0.0),
        Orientation::Rotate90CW => Transform::new(0.0, 1.0, -1.0, 0.0, h, 0.0),
        Orientation::Transverse => Transform::new(0.0, -1.0, -1.0, 0.0, h, w),
        Orientation::Rotate270CW => Transform::new(0.0, -1.0, 1.0, 0.0, 0.0, w),
    };
    Some(m)
}

/// Draws sources onto freshly allocated surfaces.
///
/// Every call allocates its own surface; nothing is pooled between calls.
#[derive(Debug, Clone)]
pub struct Renderer {
    max_surface_pixels: u64,
}

impl Renderer {
    /// Create a renderer that refuses surfaces above `max_surface_pixels`.
    pub fn new(max_surface_pixels: u64) -> Self {
        Self { max_surface_pixels }
    }

    /// Render `source` with its EXIF orientation corrected, fitted into `bound`.
    pub fn render_oriented(
        &self,
        name: &str,
        source: &RgbImage,
        orientation: Orientation,
        bound: RasterBounds,
    ) -> PipelineResult<RgbImage> {
        let intrinsic = RasterBounds::new(source.width(), source.height());
        let (output, draw) = if orientation.swaps_dimensions() {
            let output = intrinsic.transposed().fit_within(bound);
            (output, output.transposed())
        } else {
            let output = intrinsic.fit_within(bound);
            (output, output)
        };

        let mut surface = self.allocate(name, output)?;
        let drawn = match orientation_transform(orientation, draw.width as f64, draw.height as f64) {
            Some(matrix) => {
                surface.save();
                surface.transform(matrix);
                let drawn = surface.draw_image(source, 0.0, 0.0, draw.width, draw.height);
                surface.restore().and(drawn)
            }
            None => surface.draw_image(source, 0.0, 0.0, draw.width, draw.height),
        };
        drawn.map_err(|e| render_error(name, e))?;

        tracing::trace!(
            "Rendered {name}: {}x{} -> {}x{} ({:?})",
            intrinsic.width,
            intrinsic.height,
            output.width,
            output.height,
            orientation
        );
        Ok(surface.into_image())
    }

    /// Render an already-oriented raster fitted into `bound`, untransformed.
    pub fn render_fitted(
        &self,
        name: &str,
        source: &RgbImage,
        bound: RasterBounds,
    ) -> PipelineResult<RgbImage> {
        let output = RasterBounds::new(source.width(), source.height()).fit_within(bound);
        let mut surface = self.allocate(name, output)?;
        surface
            .draw_image(source, 0.0, 0.0, output.width, output.height)
            .map_err(|e| render_error(name, e))?;
        Ok(surface.into_image())
    }

    fn allocate(&self, name: &str, size: RasterBounds) -> PipelineResult<Surface> {
        Surface::new(size.width, size.height, self.max_surface_pixels)
            .map_err(|e| render_error(name, e))
    }
}

fn render_error(name: &str, err: SurfaceError) -> PipelineError {
    PipelineError::Render {
        name: name.to_string(),
        message: err.to_string(),
    }
}
