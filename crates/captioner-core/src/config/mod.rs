//! Configuration management for captioner.
//!
//! Configuration is loaded from the platform config directory (or an explicit
//! path) with defaults matching the trained model. All config structs
//! implement `Default`, so a missing file or section is never an error.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `server.port`.
pub const PORT_ENV: &str = "PORT";

/// Root configuration structure for captioner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Model artifact settings
    pub model: ModelConfig,

    /// Feature extractor shape
    pub embedding: EmbeddingConfig,

    /// Greedy decoding settings
    pub decoding: DecodingConfig,

    /// Vocabulary construction settings
    pub vocabulary: VocabularyConfig,

    /// Action extraction settings
    pub action: ActionConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist. Environment
    /// overrides are applied either way.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::read(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.captioner.captioner/config.toml
    /// - Linux: ~/.config/captioner/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\captioner\config\config.toml
    ///
    /// Falls back to ~/.captioner/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "captioner", "captioner")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".captioner").join("config.toml")
            })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let port = std::env::var(PORT_ENV).ok();
        self.apply_port_override(port.as_deref())
    }

    /// Override `server.port` from a raw `PORT` value, if one is set.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };
        self.server.port = raw.parse().map_err(|_| {
            ConfigError::ValidationError(format!("{PORT_ENV} must be a port number, got {raw:?}"))
        })?;
        Ok(())
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        expand(&self.general.model_dir)
    }

    /// Resolved path of the feature extractor model.
    pub fn feature_extractor_path(&self) -> PathBuf {
        self.model_dir().join(&self.model.feature_extractor)
    }

    /// Resolved path of the caption decoder model.
    pub fn caption_decoder_path(&self) -> PathBuf {
        self.model_dir().join(&self.model.caption_decoder)
    }

    /// Resolved path of the caption corpus (with ~ expansion).
    pub fn captions_path(&self) -> PathBuf {
        expand(&self.model.captions_path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Normalization;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.decoding.max_length, 35);
        assert_eq!(config.embedding.image_size, 224);
        assert_eq!(config.embedding.embedding_dim, 4096);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.vocabulary.normalization, Normalization::Literal);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[model]"));
        assert!(toml.contains("[decoding]"));
        assert!(toml.contains("padding = \"post\""));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[decoding]\nmax_length = 20\n\n[vocabulary]\nnormalization = \"pattern\"\n",
        )
        .unwrap();

        let config = Config::read(&path).unwrap();
        assert_eq!(config.decoding.max_length, 20);
        assert_eq!(config.decoding.padding, SequencePadding::Post);
        assert_eq!(config.vocabulary.normalization, Normalization::Pattern);
        assert_eq!(config.model.caption_decoder, "caption_decoder.onnx");
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();
        config.apply_port_override(Some("8080")).unwrap();
        assert_eq!(config.server.port, 8080);

        config.apply_port_override(None).unwrap();
        assert_eq!(config.server.port, 8080);

        config.apply_port_override(Some("  ")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_port_override_rejects_garbage() {
        let mut config = Config::default();
        let err = config.apply_port_override(Some("http")).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_model_paths_join_model_dir() {
        let mut config = Config::default();
        config.general.model_dir = PathBuf::from("/srv/models");
        assert_eq!(
            config.caption_decoder_path(),
            PathBuf::from("/srv/models/caption_decoder.onnx")
        );
        assert_eq!(
            config.feature_extractor_path(),
            PathBuf::from("/srv/models/vgg16_fc2.onnx")
        );
    }
}
