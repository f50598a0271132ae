//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.decoding.max_length < 2 {
            return Err(ConfigError::ValidationError(
                "decoding.max_length must be >= 2".into(),
            ));
        }
        if self.embedding.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.image_size must be > 0".into(),
            ));
        }
        if self.embedding.embedding_dim == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.embedding_dim must be > 0".into(),
            ));
        }
        if self.model.feature_extractor.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.feature_extractor must not be empty".into(),
            ));
        }
        if self.model.caption_decoder.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.caption_decoder must not be empty".into(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.inference_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.inference_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_max_length() {
        let mut config = Config::default();
        config.decoding.max_length = 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_length"));
    }

    #[test]
    fn test_validate_rejects_zero_embedding_dim() {
        let mut config = Config::default();
        config.embedding.embedding_dim = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("embedding_dim"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.inference_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("inference_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }
}
