//! Sub-configuration structs with defaults matching the trained model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::vocabulary::Normalization;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where model files are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./models"),
        }
    }
}

/// Model artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// VGG16 truncated at fc2, exported to ONNX (relative to `model_dir`)
    pub feature_extractor: String,

    /// Caption decoder exported to ONNX (relative to `model_dir`)
    pub caption_decoder: String,

    /// Caption corpus the vocabulary is built from
    pub captions_path: PathBuf,

    /// Run one probe step at startup to check the decoder against the vocabulary
    pub verify_on_load: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            feature_extractor: "vgg16_fc2.onnx".to_string(),
            caption_decoder: "caption_decoder.onnx".to_string(),
            captions_path: PathBuf::from("./archive/captions.txt"),
            verify_on_load: true,
        }
    }
}

/// Feature extractor input/output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Square input size in pixels
    pub image_size: u32,

    /// Length of the embedding vector produced per image
    pub embedding_dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            image_size: 224,
            embedding_dim: 4096,
        }
    }
}

/// Where zero padding goes when the token sequence is shorter than `max_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencePadding {
    /// Tokens first, zeros after
    #[default]
    Post,
    /// Zeros first, tokens last
    Pre,
}

/// Element type of the decoder's sequence input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceDtype {
    #[default]
    Float32,
    Int64,
}

/// Greedy decoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingConfig {
    /// Maximum token sequence length, markers included
    pub max_length: usize,

    /// Padding side for the decoder's sequence input
    pub padding: SequencePadding,

    /// Element type the exported decoder expects for the sequence input
    pub sequence_dtype: SequenceDtype,
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            max_length: 35,
            padding: SequencePadding::Post,
            sequence_dtype: SequenceDtype::Float32,
        }
    }
}

/// Vocabulary construction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Caption normalization mode ("literal" or "pattern").
    /// Must match the mode the decoder weights were trained with.
    pub normalization: Normalization,
}

/// Action extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Words skipped in addition to the built-in stoplist
    pub extra_stopwords: Vec<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listening port (the `PORT` environment variable takes precedence)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Feature extraction + caption decoding timeout in milliseconds
    pub inference_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            inference_timeout_ms: 30000,
        }
    }
}

impl LimitsConfig {
    /// Upload size limit in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
