//! Receipt image optimization pipeline.
//!
//! This module contains all the stages of the pipeline:
//! - **validate**: Size limit and magic-byte checks
//! - **handle**: Tracked, scoped access to the source bytes
//! - **decode**: Load and decode images from various formats
//! - **orientation**: Read the EXIF orientation tag from JPEG bytes
//! - **surface**: Bounded drawing surface with an affine transform stack
//! - **render**: Orientation correction and bounded downscaling
//! - **encode**: JPEG encoding at a given quality
//! - **thumbnail**: Small JPEG previews of the corrected image
//! - **metadata**: Capture date and camera details
//! - **hash**: Content hashes for stored receipts
//! - **optimizer**: Orchestrates the full pipeline

pub mod decode;
pub mod encode;
pub mod handle;
pub mod hash;
pub mod metadata;
pub mod optimizer;
pub mod orientation;
pub mod render;
pub mod surface;
pub mod thumbnail;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::encode_jpeg;
pub use handle::{HandleTracker, SourceHandle};
pub use hash::content_hash;
pub use metadata::{CaptureInfo, MetadataExtractor};
pub use optimizer::{OptimizeOptions, ReceiptOptimizer};
pub use orientation::{read_orientation, Orientation};
pub use render::{orientation_transform, RasterBounds, Renderer};
pub use surface::{Surface, SurfaceError, Transform};
pub use thumbnail::ThumbnailGenerator;
pub use validate::Validator;
