//! Offscreen raster surface with a 2-D affine transform stack.
//!
//! Mirrors the subset of a canvas 2-D context the pipeline needs: allocate a
//! surface, `save`/`restore` the transform, pre-multiply a `transform`, and
//! `draw_image` a source raster into a destination rectangle. Drawing maps
//! every destination pixel centre back through the inverse transform and
//! copies the source pixel that covers it, so axis-aligned flips and quarter
//! turns are exact.

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::RgbImage;
use thiserror::Error;

/// Failures raised by the surface itself; the renderer attaches file context.
#[derive(Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("surface must have non-zero dimensions, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("surface of {width}x{height} exceeds the {max_pixels} pixel budget")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("draw rectangle must have non-zero dimensions")]
    EmptyDraw,

    #[error("current transform is not invertible")]
    SingularTransform,

    #[error("restore called without a matching save")]
    UnbalancedRestore,
}

/// Affine map `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`, laid out the way a
/// canvas `transform(a, b, c, d, e, f)` call takes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn then_after(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Map a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Inverse map, or `None` if the linear part is singular.
    pub fn invert(&self) -> Option<Transform> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Transform {
            a,
            b,
            c,
            d,
            e: -(a * self.e + c * self.f),
            f: -(b * self.e + d * self.f),
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An RGB raster plus the drawing state applied to it.
#[derive(Debug)]
pub struct Surface {
    pixels: RgbImage,
    current: Transform,
    saved: Vec<Transform>,
}

impl Surface {
    /// Allocate a black surface, refusing empty or over-budget sizes.
    pub fn new(width: u32, height: u32, max_pixels: u64) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroSize { width, height });
        }
        if width as u64 * height as u64 > max_pixels {
            return Err(SurfaceError::TooLarge {
                width,
                height,
                max_pixels,
            });
        }
        Ok(Self {
            pixels: RgbImage::new(width, height),
            current: Transform::IDENTITY,
            saved: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The transform that `draw_image` will use.
    pub fn current_transform(&self) -> Transform {
        self.current
    }

    /// Push the current transform.
    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Pop the transform pushed by the matching `save`.
    pub fn restore(&mut self) -> Result<(), SurfaceError> {
        self.current = self.saved.pop().ok_or(SurfaceError::UnbalancedRestore)?;
        Ok(())
    }

    /// Pre-multiply `(a, b, c, d, e, f)` onto the current transform.
    pub fn transform(&mut self, m: Transform) {
        self.current = self.current.then_after(&m);
    }

    /// Draw `source` scaled to `dw x dh` at `(dx, dy)` in user space.
    ///
    /// The source is resampled once with a triangle filter, then placed through
    /// the current transform. Destination pixels the rectangle does not cover
    /// keep their previous value.
    pub fn draw_image(
        &mut self,
        source: &RgbImage,
        dx: f64,
        dy: f64,
        dw: u32,
        dh: u32,
    ) -> Result<(), SurfaceError> {
        if dw == 0 || dh == 0 || source.width() == 0 || source.height() == 0 {
            return Err(SurfaceError::EmptyDraw);
        }
        let inverse = self.current.invert().ok_or(SurfaceError::SingularTransform)?;

        let scaled: Cow<'_, RgbImage> = if source.dimensions() == (dw, dh) {
            Cow::Borrowed(source)
        } else {
            Cow::Owned(imageops::resize(source, dw, dh, FilterType::Triangle))
        };

        let (width, height) = self.pixels.dimensions();
        for py in 0..height {
            for px in 0..width {
                let (ux, uy) = inverse.apply(px as f64 + 0.5, py as f64 + 0.5);
                let sx = ux - dx;
                let sy = uy - dy;
                if sx < 0.0 || sy < 0.0 || sx >= dw as f64 || sy >= dh as f64 {
                    continue;
                }
                let sx = (sx.floor() as u32).min(dw - 1);
                let sy = (sy.floor() as u32).min(dh - 1);
                self.pixels.put_pixel(px, py, *scaled.get_pixel(sx, sy));
            }
        }
        Ok(())
    }

    /// Borrow the rendered pixels.
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Consume the surface, keeping only its pixels.
    pub fn into_image(self) -> RgbImage {
        self.pixels
    }
}
