//! Tally Core - receipt image pipeline and finance record storage.
//!
//! The centre of the crate is the receipt optimizer: it takes a photo as the
//! user picked it, corrects its EXIF orientation, bounds its size, re-encodes
//! it as JPEG and produces a thumbnail, all before anything is stored.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Validate → Decode → Read Orientation → Render (rotate + fit) → Encode → Thumbnail
//! ```
//!
//! Around it sit the records a budgeting app keeps (expenses, incomes,
//! categories, budgets) behind a small [`store::Repository`] trait, and a
//! [`store::BlobStore`] the optimized receipts are written to.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tally_core::{Config, ReceiptOptimizer, SourceImage};
//!
//! #[tokio::main]
//! async fn main() -> tally_core::Result<()> {
//!     let config = Config::load()?;
//!     let optimizer = ReceiptOptimizer::new(&config);
//!
//!     let source = SourceImage::from_path("./receipt.jpg".as_ref()).await?;
//!     let optimized = optimizer.optimize(&source).await?;
//!     println!("{}x{}", optimized.width, optimized.height);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, StoreError, StoreResult, TallyError};
pub use pipeline::{OptimizeOptions, Orientation, ReceiptOptimizer};
pub use store::{LocalBlobStore, MemoryRepository, ReceiptMetadata, ReceiptStorage};
pub use types::{EncodedImage, OptimizedImage, SourceImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
