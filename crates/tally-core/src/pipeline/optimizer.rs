//! Pipeline orchestration - wires together all optimization stages.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, OptimizeConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::types::{EncodedImage, OptimizedImage, SourceImage};

use super::decode::{format_to_string, ImageDecoder};
use super::encode::encode_jpeg;
use super::handle::HandleTracker;
use super::orientation::{read_orientation, Orientation};
use super::render::{RasterBounds, Renderer};
use super::thumbnail::ThumbnailGenerator;
use super::validate::Validator;

/// Options for controlling a single optimization.
#[derive(Debug, Clone, Default)]
pub struct OptimizeOptions {
    /// Skip thumbnail generation even if enabled in config
    pub skip_thumbnail: bool,
}

/// Blocking-pool stage, for reporting a task that panicked or was cancelled.
/// The thumbnail task renders and then encodes; its failures are reported as
/// render errors.
#[derive(Debug, Clone, Copy)]
enum Stage {
    Render,
    Encode,
    Thumbnail,
}

impl Stage {
    fn join_error(self, name: &str, error: tokio::task::JoinError) -> PipelineError {
        let name = name.to_string();
        match self {
            Stage::Render => PipelineError::Render {
                name,
                message: format!("Task join error: {error}"),
            },
            Stage::Encode => PipelineError::Encode {
                name,
                message: format!("Task join error: {error}"),
            },
            Stage::Thumbnail => PipelineError::Render {
                name,
                message: format!("Thumbnail task join error: {error}"),
            },
        }
    }
}

/// Prepares receipt photos for upload: orientation fix, bounded resize,
/// JPEG re-encode and thumbnail.
///
/// Holds no per-call state, so one optimizer can serve any number of
/// concurrent calls.
pub struct ReceiptOptimizer {
    validator: Validator,
    decoder: ImageDecoder,
    renderer: Renderer,
    thumbnails: ThumbnailGenerator,
    full: OptimizeConfig,
    handles: HandleTracker,
}

impl ReceiptOptimizer {
    /// Create a new optimizer with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_tracker(config, HandleTracker::new())
    }

    /// Create an optimizer that issues source handles from `handles`.
    pub fn with_tracker(config: &Config, handles: HandleTracker) -> Self {
        let renderer = Renderer::new(config.limits.max_surface_pixels);
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            thumbnails: ThumbnailGenerator::new(config.thumbnail.clone(), renderer.clone()),
            renderer,
            full: config.optimize.clone(),
            handles,
        }
    }

    /// Tracker for the source handles this optimizer takes.
    pub fn handles(&self) -> &HandleTracker {
        &self.handles
    }

    /// Largest full-size output allowed.
    pub fn full_bound(&self) -> RasterBounds {
        RasterBounds::new(self.full.max_width, self.full.max_height)
    }

    /// Optimize one receipt photo.
    pub async fn optimize(&self, source: &SourceImage) -> PipelineResult<OptimizedImage> {
        self.optimize_with_options(source, &OptimizeOptions::default())
            .await
    }

    /// Optimize one receipt photo with custom options.
    ///
    /// Either a complete [`OptimizedImage`] is returned or the first stage
    /// error is; the source handle is released on both paths.
    pub async fn optimize_with_options(
        &self,
        source: &SourceImage,
        options: &OptimizeOptions,
    ) -> PipelineResult<OptimizedImage> {
        let result = self.run(source, options).await;
        if let Err(e) = &result {
            tracing::warn!(stage = e.stage(), "Failed to optimize {}: {e}", source.name());
        }
        result
    }

    async fn run(
        &self,
        source: &SourceImage,
        options: &OptimizeOptions,
    ) -> PipelineResult<OptimizedImage> {
        let start = Instant::now();
        let name = source.name().to_string();
        tracing::debug!(
            "Optimizing: {name} ({} bytes, declared {})",
            source.len(),
            source.media_type()
        );

        self.validator.validate(source)?;

        let handle = self.handles.acquire(source);

        let decode_start = Instant::now();
        let decoded = self.decoder.decode(&handle).await?;
        tracing::trace!(
            "  Decode: {:?} ({})",
            decode_start.elapsed(),
            format_to_string(decoded.format)
        );

        let orientation = read_orientation(handle.bytes());
        if orientation != Orientation::Normal {
            tracing::trace!("  Orientation: {:?}", orientation);
        }

        let render_start = Instant::now();
        let full_raster = {
            let renderer = self.renderer.clone();
            let bound = self.full_bound();
            let image = decoded.image;
            let task_name = name.clone();
            run_blocking(&name, Stage::Render, move || {
                renderer.render_oriented(&task_name, &image, orientation, bound)
            })
            .await?
        };
        let full_raster = Arc::new(full_raster);
        let (width, height) = full_raster.dimensions();
        tracing::trace!("  Render: {:?}", render_start.elapsed());

        let encode_start = Instant::now();
        let full_data = {
            let raster = Arc::clone(&full_raster);
            let quality = self.full.quality;
            let task_name = name.clone();
            run_blocking(&name, Stage::Encode, move || {
                encode_jpeg(&task_name, &raster, quality)
            })
            .await?
        };
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        let thumb_start = Instant::now();
        let thumbnail = if options.skip_thumbnail || !self.thumbnails.is_enabled() {
            None
        } else {
            let thumbnails = self.thumbnails.clone();
            let task_name = name.clone();
            run_blocking(&name, Stage::Thumbnail, move || {
                thumbnails.generate(&task_name, &full_raster)
            })
            .await?
        };
        tracing::trace!("  Thumbnail: {:?}", thumb_start.elapsed());

        drop(handle);

        tracing::debug!(
            "Optimized {name} in {:?} ({}x{} -> {}x{}, {} bytes)",
            start.elapsed(),
            decoded.width,
            decoded.height,
            width,
            height,
            full_data.len()
        );

        Ok(OptimizedImage {
            full: EncodedImage::jpeg(full_data, name),
            width,
            height,
            thumbnail,
            orientation,
        })
    }
}

/// Run a CPU-bound stage on the blocking pool.
async fn run_blocking<T, F>(name: &str, stage: Stage, work: F) -> PipelineResult<T>
where
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| stage.join_error(name, e))?
}
