//! Error types for the captioning service.
//!
//! Errors fall into two families:
//! - [`ConfigError`]: anything that prevents the service from starting
//!   (bad config, missing corpus, missing or incompatible model files).
//! - [`PipelineError`]: per-request failures. Input problems are reported back
//!   to the caller; inference problems surface as server errors. Neither stops
//!   the process.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration and startup errors. All of these are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The caption corpus used to build the vocabulary does not exist
    #[error("Caption corpus not found: {0}")]
    CorpusNotFound(PathBuf),

    /// The corpus was readable but produced an unusable vocabulary
    #[error("Invalid caption corpus {path}: {message}")]
    InvalidCorpus { path: PathBuf, message: String },

    /// A model file does not exist
    #[error("Model not found: {0}")]
    ModelNotFound(PathBuf),

    /// The runtime could not load a model file
    #[error("Failed to load model {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    /// A model loaded but does not fit the vocabulary or expected shapes
    #[error("Incompatible model {path}: {message}")]
    IncompatibleModel { path: PathBuf, message: String },
}

/// Per-request pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The request carried no image
    #[error("No image provided")]
    MissingImage,

    /// Local input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input exceeds the upload size limit
    #[error("File too large: {input} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        input: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Unrecognized or unsupported image format
    #[error("Unsupported format for {input}: {format}")]
    UnsupportedFormat { input: String, format: String },

    /// Image decoding failed
    #[error("Decode error for {input}: {message}")]
    Decode { input: String, message: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {input} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        input: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Feature extraction failed
    #[error("Feature extraction failed: {message}")]
    Embedding { message: String },

    /// Caption decoder inference failed
    #[error("Caption decoding failed: {message}")]
    Decoder { message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {input} after {timeout_ms}ms")]
    Timeout {
        input: String,
        stage: String,
        timeout_ms: u64,
    },
}

impl PipelineError {
    /// Whether this error was caused by the caller's input rather than the
    /// service itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingImage
                | PipelineError::FileNotFound(_)
                | PipelineError::FileTooLarge { .. }
                | PipelineError::UnsupportedFormat { .. }
                | PipelineError::Decode { .. }
                | PipelineError::ImageTooLarge { .. }
        )
    }
}

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_message() {
        assert_eq!(PipelineError::MissingImage.to_string(), "No image provided");
    }

    #[test]
    fn test_input_error_classification() {
        assert!(PipelineError::MissingImage.is_input_error());
        assert!(PipelineError::Decode {
            input: "upload".into(),
            message: "corrupt".into(),
        }
        .is_input_error());
        assert!(!PipelineError::Decoder {
            message: "oom".into()
        }
        .is_input_error());
        assert!(!PipelineError::Timeout {
            input: "upload".into(),
            stage: "inference".into(),
            timeout_ms: 10,
        }
        .is_input_error());
    }
}
