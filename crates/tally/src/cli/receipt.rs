//! The `tally receipt` command for stored receipts.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use tally_core::{Config, LocalBlobStore, ReceiptOptimizer, ReceiptStorage};

use super::{load_source, optimize_timeout};

/// Arguments for the `receipt` command.
#[derive(Args, Debug)]
pub struct ReceiptArgs {
    #[command(subcommand)]
    pub command: ReceiptCommand,
}

/// Subcommands for receipt storage.
#[derive(Subcommand, Debug)]
pub enum ReceiptCommand {
    /// Optimize a receipt photo and store it for an expense
    Upload {
        /// Owner of the receipt
        #[arg(long, env = "TALLY_USER")]
        user: String,

        /// Expense the receipt belongs to
        #[arg(long)]
        expense: String,

        /// Receipt photo to upload
        input: PathBuf,
    },

    /// List a user's stored receipts
    List {
        #[arg(long, env = "TALLY_USER")]
        user: String,
    },

    /// Delete a stored receipt and its thumbnail
    Delete {
        /// Blob path as printed by `upload` or `list`
        path: String,
    },
}

fn storage(config: &Config) -> ReceiptStorage {
    let root = config.storage_root();
    tracing::debug!("Receipt storage at {}", root.display());
    ReceiptStorage::new(
        Box::new(LocalBlobStore::new(root)),
        ReceiptOptimizer::new(config),
    )
}

/// Execute the receipt command.
pub async fn execute(args: ReceiptArgs, config: &Config) -> anyhow::Result<()> {
    let storage = storage(config);

    match args.command {
        ReceiptCommand::Upload {
            user,
            expense,
            input,
        } => {
            let source = load_source(&input, config).await?;
            let metadata = tokio::time::timeout(
                optimize_timeout(config),
                storage.upload_receipt(&user, &expense, &source),
            )
            .await
            .with_context(|| format!("Timed out uploading {}", input.display()))??;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }

        ReceiptCommand::List { user } => {
            for path in storage.list_user_receipts(&user).await? {
                println!("{path}");
            }
        }

        ReceiptCommand::Delete { path } => {
            storage.delete_receipt(&path).await?;
            println!("Deleted {path}");
        }
    }

    Ok(())
}
