//! Process-wide inference state.
//!
//! Everything here is built once at startup and then only read. Request
//! handlers share one [`InferenceContext`] behind an `Arc`.

use std::time::Instant;

use image::DynamicImage;

use crate::action::ActionExtractor;
use crate::config::Config;
use crate::decoder::CaptionDecoder;
use crate::embedding::EmbeddingEngine;
use crate::error::{ConfigError, PipelineResult};
use crate::types::CaptionResult;
use crate::vocabulary::Vocabulary;

/// Vocabulary, both models and the action extractor.
pub struct InferenceContext {
    vocabulary: Vocabulary,
    embedding: EmbeddingEngine,
    decoder: CaptionDecoder,
    actions: ActionExtractor,
}

impl InferenceContext {
    /// Build the vocabulary and load both models.
    ///
    /// Steps run in order: vocabulary, feature extractor, caption decoder.
    /// The decoder is checked against the vocabulary before this returns, so
    /// a successful load means the service can answer requests.
    pub fn load(config: &Config) -> Result<Self, ConfigError> {
        let start = Instant::now();

        let vocabulary =
            Vocabulary::from_corpus_file(&config.captions_path(), config.vocabulary.normalization)?;
        tracing::info!(
            "Vocabulary hash: {} ({} indices)",
            vocabulary.content_hash(),
            vocabulary.cardinality()
        );

        let embedding = EmbeddingEngine::load(config)?;
        let decoder = CaptionDecoder::load(config, &vocabulary)?;
        let actions = ActionExtractor::new(&config.action.extra_stopwords);

        tracing::info!("Inference context ready in {:?}", start.elapsed());

        Ok(Self::from_parts(vocabulary, embedding, decoder, actions))
    }

    /// Assemble a context from already-built parts.
    pub fn from_parts(
        vocabulary: Vocabulary,
        embedding: EmbeddingEngine,
        decoder: CaptionDecoder,
        actions: ActionExtractor,
    ) -> Self {
        Self {
            vocabulary,
            embedding,
            decoder,
            actions,
        }
    }

    /// Caption one decoded image. Blocking; call from `spawn_blocking`.
    pub fn caption_image(&self, image: &DynamicImage) -> PipelineResult<CaptionResult> {
        let features = self.embedding.embed(image)?;
        let decoded = self.decoder.decode(&self.vocabulary, &features)?;
        let action = self.actions.extract(&decoded.text);

        tracing::debug!(
            "Caption: {:?} (action: {}, finished: {})",
            decoded.text,
            action,
            decoded.finished
        );

        Ok(CaptionResult {
            caption: decoded.text,
            action,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Maximum caption length in tokens, markers included.
    pub fn max_length(&self) -> usize {
        self.decoder.max_length()
    }
}
