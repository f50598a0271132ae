//! Command implementations.

pub mod caption;
pub mod config;
pub mod serve;
pub mod vocab;

use std::path::Path;
use std::sync::Arc;

use captioner_core::{CaptionProcessor, Config, ConfigError, InferenceContext};

/// Load the config from an explicit path, or from the platform default.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Build the vocabulary and load both models off the async runtime.
pub async fn load_processor(config: &Config) -> anyhow::Result<CaptionProcessor> {
    let load_config = config.clone();
    let context =
        tokio::task::spawn_blocking(move || InferenceContext::load(&load_config)).await??;
    Ok(CaptionProcessor::new(Arc::new(context), config))
}
