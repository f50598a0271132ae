//! Caption decoding.
//!
//! A recurrent decoder maps (image features, tokens so far) to a distribution
//! over the next token. [`GreedyDecoder`] drives it one step at a time.
//!
//! The decoder topology is fixed by the exported model:
//!
//! ```text
//! features (4096) ─ dropout ─ dense 256 relu ─┐
//!                                             add ─ dense 256 relu ─ dense |V| softmax
//! tokens (35) ─ embed 256 (mask 0) ─ dropout ─ LSTM 256 ─┘
//! ```

mod greedy;
mod onnx;

pub use greedy::{pad_sequence, DecodedCaption, GreedyDecoder};
pub use onnx::DecoderSession;

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{ConfigError, PipelineError};
use crate::vocabulary::Vocabulary;

/// Predicts the next-token distribution.
///
/// Implementations must be safe to call from several threads at once.
pub trait NextTokenModel: Send + Sync {
    /// `sequence` is already padded to the model's fixed length. The result
    /// holds one probability per vocabulary index, index 0 included.
    fn predict(&self, features: &[f32], sequence: &[i64]) -> Result<Vec<f32>, PipelineError>;
}

/// Loaded caption decoder plus its decoding settings.
pub struct CaptionDecoder {
    model: Box<dyn NextTokenModel>,
    greedy: GreedyDecoder,
}

impl CaptionDecoder {
    /// Load the decoder named in the config and check it against `vocabulary`.
    pub fn load(config: &Config, vocabulary: &Vocabulary) -> Result<Self, ConfigError> {
        let model_path = Self::model_path(config);

        if !model_path.exists() {
            return Err(ConfigError::ModelNotFound(model_path));
        }

        tracing::info!("Loading caption decoder from {:?}", model_path);
        let session = DecoderSession::load(&model_path, config.decoding.sequence_dtype)?;
        let decoder = Self::with_model(
            Box::new(session),
            GreedyDecoder::new(config.decoding.max_length, config.decoding.padding),
        );

        if config.model.verify_on_load {
            decoder
                .verify(vocabulary, config.embedding.embedding_dim)
                .map_err(|e| ConfigError::IncompatibleModel {
                    path: model_path.clone(),
                    message: e.to_string(),
                })?;
            tracing::debug!(
                "Caption decoder output matches vocabulary ({} indices)",
                vocabulary.cardinality()
            );
        }

        tracing::info!("Caption decoder loaded successfully");
        Ok(decoder)
    }

    /// Build a decoder around any next-token model.
    pub fn with_model(model: Box<dyn NextTokenModel>, greedy: GreedyDecoder) -> Self {
        Self { model, greedy }
    }

    /// Maximum token sequence length.
    pub fn max_length(&self) -> usize {
        self.greedy.max_length()
    }

    /// Decode a caption for one feature vector.
    pub fn decode(
        &self,
        vocabulary: &Vocabulary,
        features: &[f32],
    ) -> Result<DecodedCaption, PipelineError> {
        self.greedy.decode(self.model.as_ref(), vocabulary, features)
    }

    /// Query the model once with blank features and a start-only sequence and
    /// check that its output covers exactly the vocabulary.
    pub fn verify(&self, vocabulary: &Vocabulary, embedding_dim: usize) -> Result<(), PipelineError> {
        let features = vec![0.0f32; embedding_dim];
        let sequence = pad_sequence(
            &[vocabulary.start_id()],
            self.greedy.max_length(),
            self.greedy.padding(),
        );
        let probs = self.model.predict(&features, &sequence)?;
        if probs.len() != vocabulary.cardinality() {
            return Err(PipelineError::Decoder {
                message: format!(
                    "model outputs {} classes but the vocabulary has {} indices; \
                     was it trained with a different corpus or normalization?",
                    probs.len(),
                    vocabulary.cardinality()
                ),
            });
        }
        Ok(())
    }

    /// Get the expected model file path.
    pub fn model_path(config: &Config) -> PathBuf {
        config.caption_decoder_path()
    }
}
