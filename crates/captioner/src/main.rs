//! Captioner CLI - HTTP image captioning service.
//!
//! Captioner generates a one-sentence caption for an uploaded image with a
//! VGG16 feature extractor and a recurrent caption decoder, and picks the
//! action word out of the caption.
//!
//! # Usage
//!
//! ```bash
//! # Serve the web page and the /predict endpoint
//! captioner serve --port 5000
//!
//! # Caption a single local image
//! captioner caption dog.jpg --pretty
//!
//! # Inspect the vocabulary built from the caption corpus
//! captioner vocab --top 20
//!
//! # View configuration
//! captioner config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// Captioner - image captioning service backed by a CNN encoder and LSTM decoder.
#[derive(Parser, Debug)]
#[command(name = "captioner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "CAPTIONER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the models and serve HTTP requests
    Serve(cli::serve::ServeArgs),

    /// Caption a local image file
    Caption(cli::caption::CaptionArgs),

    /// Build the vocabulary from the caption corpus and summarize it
    Vocab(cli::vocab::VocabArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so a broken config only surfaces once a
    // command that needs it runs.
    let loaded = cli::load_config(cli.config.as_deref());
    let log_config = loaded.as_ref().cloned().unwrap_or_default();
    logging::init_from_config(&log_config, cli.verbose, cli.json_logs);

    tracing::debug!("Captioner v{}", captioner_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, loaded?).await,
        Commands::Caption(args) => cli::caption::execute(args, loaded?).await,
        Commands::Vocab(args) => cli::vocab::execute(args, loaded?).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()).await,
    }
}
