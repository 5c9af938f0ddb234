//! The `tally config` command for configuration management.

use std::path::Path;

use clap::{Args, Subcommand};
use tally_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show the config file path and where receipts are stored
    Path,

    /// Write a config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Config file location and the resolved receipt storage root, one per line.
fn describe_paths(config_path: &Path, config: &Config) -> String {
    format!(
        "Config:   {}\nReceipts: {}",
        config_path.display(),
        config.storage_root().display()
    )
}

/// Execute the config command.
///
/// `config` is the configuration already loaded at startup, defaults
/// included if the file was missing or unreadable.
pub async fn execute(args: ConfigArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", describe_paths(&Config::default_path(), config));
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, Config::default().to_toml()?).await?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}
