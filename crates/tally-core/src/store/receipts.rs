//! Receipt upload, listing and removal on top of a [`BlobStore`].
//!
//! Receipts live at `receipts/{user}/{expense}_{id}.jpg` with the thumbnail
//! beside them as `thumb_{expense}_{id}.jpg`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::pipeline::{content_hash, CaptureInfo, MetadataExtractor, Orientation, ReceiptOptimizer};
use crate::types::{SourceImage, THUMBNAIL_PREFIX};

use super::blob::BlobStore;
use super::memory::generate_id;

/// Top-level directory of all receipts.
pub const RECEIPTS_DIR: &str = "receipts";

/// Directory holding one user's receipts.
pub fn user_receipts_path(user_id: &str) -> String {
    format!("{RECEIPTS_DIR}/{user_id}")
}

/// Path of the thumbnail stored next to `path`.
pub fn thumbnail_path(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/{THUMBNAIL_PREFIX}{file}"),
        None => format!("{THUMBNAIL_PREFIX}{path}"),
    }
}

/// What was stored for one uploaded receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptMetadata {
    pub user_id: String,
    pub expense_id: String,
    /// Blob path of the optimized image
    pub path: String,
    /// File name the user picked
    pub original_name: String,
    /// Media type of the stored image
    pub content_type: String,
    /// Stored image size in bytes
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// BLAKE3 hex digest of the stored image
    pub content_hash: String,
    /// Orientation the source declared and that was corrected
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureInfo>,
}

/// Optimizes receipt photos and keeps them in a blob store.
pub struct ReceiptStorage {
    store: Box<dyn BlobStore>,
    optimizer: ReceiptOptimizer,
}

impl ReceiptStorage {
    pub fn new(store: Box<dyn BlobStore>, optimizer: ReceiptOptimizer) -> Self {
        Self { store, optimizer }
    }

    /// The underlying blob store.
    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }

    pub fn optimizer(&self) -> &ReceiptOptimizer {
        &self.optimizer
    }

    /// Optimize `source` and store it, plus its thumbnail, for an expense.
    ///
    /// A failed write removes whatever the upload already put in the store,
    /// partial blobs included, so a failed upload leaves nothing behind.
    pub async fn upload_receipt(
        &self,
        user_id: &str,
        expense_id: &str,
        source: &SourceImage,
    ) -> Result<ReceiptMetadata> {
        check_segment(user_id)?;
        check_segment(expense_id)?;

        let optimized = self.optimizer.optimize(source).await?;
        let capture = MetadataExtractor::extract(source.bytes());

        let file_name = format!("{expense_id}_{}.jpg", generate_id());
        let path = format!("{}/{file_name}", user_receipts_path(user_id));
        if let Err(e) = self.store.put(&path, &optimized.full.data).await {
            self.discard(&path).await;
            return Err(e.into());
        }

        let thumbnail_path = match &optimized.thumbnail {
            Some(thumb) => {
                let thumb_path = thumbnail_path(&path);
                if let Err(e) = self.store.put(&thumb_path, &thumb.data).await {
                    self.discard(&thumb_path).await;
                    self.discard(&path).await;
                    return Err(e.into());
                }
                Some(thumb_path)
            }
            None => None,
        };

        tracing::info!(
            "Uploaded receipt {path} ({}x{}, {} bytes)",
            optimized.width,
            optimized.height,
            optimized.full.size()
        );

        Ok(ReceiptMetadata {
            user_id: user_id.to_string(),
            expense_id: expense_id.to_string(),
            path,
            original_name: source.name().to_string(),
            content_type: optimized.full.media_type.clone(),
            size: optimized.full.size() as u64,
            uploaded_at: Utc::now(),
            width: optimized.width,
            height: optimized.height,
            thumbnail_path,
            content_hash: content_hash(&optimized.full.data),
            orientation: optimized.orientation,
            capture,
        })
    }

    /// Remove a blob left by a failed upload. Absent blobs are fine.
    async fn discard(&self, path: &str) {
        match self.store.delete(path).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => {}
            Err(e) => tracing::warn!("Could not remove {path} after failed upload: {e}"),
        }
    }

    /// Delete a stored receipt and, if present, its thumbnail.
    pub async fn delete_receipt(&self, path: &str) -> Result<()> {
        self.store.delete(path).await?;

        let thumb_path = thumbnail_path(path);
        match self.store.delete(&thumb_path).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => {}
            Err(e) => tracing::debug!("Thumbnail {thumb_path} not removed: {e}"),
        }
        Ok(())
    }

    /// Paths of everything stored for `user_id`, thumbnails included.
    pub async fn list_user_receipts(&self, user_id: &str) -> Result<Vec<String>> {
        check_segment(user_id)?;
        Ok(self.store.list(&user_receipts_path(user_id)).await?)
    }
}

/// Ids become path segments, so they must be non-empty and slash-free.
fn check_segment(id: &str) -> std::result::Result<(), StoreError> {
    if id.is_empty() || id.contains('/') || id == "." || id == ".." {
        return Err(StoreError::InvalidPath(id.to_string()));
    }
    Ok(())
}
