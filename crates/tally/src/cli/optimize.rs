//! The `tally optimize` command.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tally_core::types::THUMBNAIL_PREFIX;
use tally_core::{Config, OptimizeOptions, ReceiptOptimizer};

use super::{load_source, optimize_timeout};

/// Arguments for the `optimize` command.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Receipt photo to optimize
    #[arg(required = true)]
    pub input: PathBuf,

    /// Directory to write the optimized image and thumbnail to
    #[arg(short, long, default_value = "optimized")]
    pub out_dir: PathBuf,

    /// Disable thumbnail generation
    #[arg(long)]
    pub no_thumbnail: bool,
}

/// What `optimize` prints to stdout.
#[derive(Debug, Serialize)]
struct OptimizeSummary {
    input: PathBuf,
    output: PathBuf,
    width: u32,
    height: u32,
    /// EXIF orientation value that was corrected (1 = none)
    orientation: u16,
    input_size: usize,
    output_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<PathBuf>,
    elapsed_ms: u64,
}

/// Output file names: `<stem>.jpg` and its `thumb_` sibling.
fn output_names(input: &Path) -> (String, String) {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");
    let full = format!("{stem}.jpg");
    let thumb = format!("{THUMBNAIL_PREFIX}{full}");
    (full, thumb)
}

/// Execute the optimize command.
pub async fn execute(args: OptimizeArgs, config: &Config) -> anyhow::Result<()> {
    let start = Instant::now();
    let source = load_source(&args.input, config).await?;
    let optimizer = ReceiptOptimizer::new(config);
    let options = OptimizeOptions {
        skip_thumbnail: args.no_thumbnail,
    };

    let optimized = tokio::time::timeout(
        optimize_timeout(config),
        optimizer.optimize_with_options(&source, &options),
    )
    .await
    .with_context(|| {
        format!(
            "Timed out after {}ms optimizing {}",
            config.limits.timeout_ms,
            args.input.display()
        )
    })??;

    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let (full_name, thumb_name) = output_names(&args.input);
    let output = args.out_dir.join(full_name);
    tokio::fs::write(&output, &optimized.full.data)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let thumbnail = match &optimized.thumbnail {
        Some(thumb) => {
            let path = args.out_dir.join(thumb_name);
            tokio::fs::write(&path, &thumb.data)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Some(path)
        }
        None => None,
    };

    tracing::info!(
        "Optimized {} -> {} ({}x{})",
        args.input.display(),
        output.display(),
        optimized.width,
        optimized.height
    );

    let summary = OptimizeSummary {
        input: args.input,
        output,
        width: optimized.width,
        height: optimized.height,
        orientation: optimized.orientation.tag(),
        input_size: source.len(),
        output_size: optimized.full.size(),
        thumbnail,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
