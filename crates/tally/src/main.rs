//! Tally CLI - receipt preprocessing and storage for the Tally finance tracker.
//!
//! Receipt photos are orientation-corrected, downscaled and re-encoded as
//! JPEG before they are stored, with a small thumbnail alongside.
//!
//! # Usage
//!
//! ```bash
//! # Optimize a single receipt photo
//! tally optimize receipt.jpg --out-dir ./optimized
//!
//! # Store a receipt for an expense
//! tally receipt upload --user u1 --expense e1 receipt.jpg
//!
//! # View configuration
//! tally config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Tally - receipt preprocessing and storage.
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Optimize a receipt photo and write the result to disk
    Optimize(cli::optimize::OptimizeArgs),

    /// Upload, list and delete stored receipts
    Receipt(cli::receipt::ReceiptArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match tally_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `tally config path`."
            );
            tally_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Tally v{}", tally_core::VERSION);

    match cli.command {
        Commands::Optimize(args) => cli::optimize::execute(args, &config).await,
        Commands::Receipt(args) => cli::receipt::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config).await,
    }
}
