//! Image feature extraction.
//!
//! Converts images into fixed-length feature vectors with a VGG16 network
//! (classification head removed) running locally via ONNX Runtime. The vector
//! is computed once per image and reused by every decoding step.
//!
//! # Usage
//!
//! ```rust,ignore
//! use captioner_core::embedding::EmbeddingEngine;
//! use captioner_core::Config;
//!
//! let config = Config::default();
//! let engine = EmbeddingEngine::load(&config)?;
//! let features = engine.embed(&decoded_image)?;
//! // features is a Vec<f32> with 4096 elements
//! ```

pub mod preprocess;
pub(crate) mod vgg;

use std::path::PathBuf;

use image::DynamicImage;
use ndarray::Array4;

use crate::config::Config;
use crate::error::{ConfigError, PipelineError};

use self::preprocess::preprocess;
pub use self::vgg::VggSession;

/// Maps a preprocessed image tensor to a feature vector.
///
/// Implementations must be safe to call from several threads at once.
pub trait FeatureExtractor: Send + Sync {
    /// Run the network on a \[1, H, W, 3\] tensor.
    fn extract(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, PipelineError>;
}

/// Engine for turning images into feature vectors.
pub struct EmbeddingEngine {
    extractor: Box<dyn FeatureExtractor>,
    image_size: u32,
    embedding_dim: usize,
}

impl EmbeddingEngine {
    /// Load the VGG16 feature extractor named in the config.
    pub fn load(config: &Config) -> Result<Self, ConfigError> {
        let model_path = Self::model_path(config);

        if !model_path.exists() {
            return Err(ConfigError::ModelNotFound(model_path));
        }

        tracing::info!("Loading feature extractor from {:?}", model_path);
        let session = VggSession::load(&model_path)?;
        tracing::info!("Feature extractor loaded successfully");

        let engine = Self::with_extractor(
            Box::new(session),
            config.embedding.image_size,
            config.embedding.embedding_dim,
        );

        if config.model.verify_on_load {
            engine.verify().map_err(|e| ConfigError::IncompatibleModel {
                path: model_path,
                message: e.to_string(),
            })?;
        }

        Ok(engine)
    }

    /// Build an engine around any extractor.
    pub fn with_extractor(
        extractor: Box<dyn FeatureExtractor>,
        image_size: u32,
        embedding_dim: usize,
    ) -> Self {
        Self {
            extractor,
            image_size,
            embedding_dim,
        }
    }

    /// Generate the feature vector for an image.
    pub fn embed(&self, image: &DynamicImage) -> Result<Vec<f32>, PipelineError> {
        let tensor = preprocess(image, self.image_size);
        self.embed_preprocessed(&tensor)
    }

    /// Generate the feature vector from an already-preprocessed tensor.
    pub fn embed_preprocessed(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let features = self.extractor.extract(tensor)?;
        if features.len() != self.embedding_dim {
            return Err(PipelineError::Embedding {
                message: format!(
                    "expected {} features, model produced {}",
                    self.embedding_dim,
                    features.len()
                ),
            });
        }
        Ok(features)
    }

    /// Run a blank image through the extractor to check its output width.
    fn verify(&self) -> Result<(), PipelineError> {
        let size = self.image_size as usize;
        let blank = Array4::<f32>::zeros((1, size, size, preprocess::CHANNELS));
        self.embed_preprocessed(&blank).map(|_| ())
    }

    /// Check whether the model file exists on disk.
    pub fn model_exists(config: &Config) -> bool {
        Self::model_path(config).exists()
    }

    /// Get the expected model file path.
    pub fn model_path(config: &Config) -> PathBuf {
        config.feature_extractor_path()
    }
}
