//! Command implementations.

pub mod config;
pub mod optimize;
pub mod receipt;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tally_core::pipeline::Validator;
use tally_core::{Config, SourceImage};

/// Read a receipt photo from disk, refusing files over the size limit
/// before any of it is loaded.
pub(crate) async fn load_source(path: &Path, config: &Config) -> anyhow::Result<SourceImage> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    Validator::new(config.limits.clone()).check_size(&name, metadata.len())?;

    SourceImage::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// How long one optimization may take before the command gives up.
pub(crate) fn optimize_timeout(config: &Config) -> Duration {
    Duration::from_millis(config.limits.timeout_ms)
}
