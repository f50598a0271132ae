//! The `captioner config` command for configuration management.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use captioner_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration (file, defaults and PORT)
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
///
/// `explicit` is the `--config` path, if one was given.
pub async fn execute(args: ConfigArgs, explicit: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = super::load_config(explicit)?;
            let toml = config.to_toml()?;
            println!("{}", toml);
        }

        ConfigCommand::Path => {
            println!("{}", config_path(explicit).display());
        }

        ConfigCommand::Init { force } => {
            let path = config_path(explicit);

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            // Ensure parent directory exists
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }

            let toml = Config::default().to_toml()?;
            std::fs::write(&path, toml)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path)
}
