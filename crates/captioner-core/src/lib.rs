//! Captioner Core - image captioning library.
//!
//! Generates a one-sentence caption for an image and picks a single "action"
//! word out of it. Two pretrained models run locally through ONNX Runtime:
//! a VGG16 feature extractor and a recurrent caption decoder. The decoder's
//! vocabulary is rebuilt at startup from the caption corpus it was trained on.
//!
//! # Architecture
//!
//! ```text
//! bytes → Validate → Decode → Preprocess (224×224 BGR) → VGG16 → Greedy decode → Action → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use captioner_core::{CaptionProcessor, Config, InferenceContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let context = Arc::new(InferenceContext::load(&config)?);
//!     let processor = CaptionProcessor::new(context, &config);
//!
//!     let result = processor.process_path("./dog.jpg".as_ref()).await?;
//!     println!("{} ({})", result.caption, result.action);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod action;
pub mod config;
pub mod context;
pub mod decoder;
pub mod embedding;
pub mod error;
pub mod math;
pub mod pipeline;
mod session;
pub mod types;
pub mod vocabulary;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenient access
pub use action::{extract_action, ActionExtractor};
pub use config::Config;
pub use context::InferenceContext;
pub use decoder::{CaptionDecoder, GreedyDecoder};
pub use embedding::EmbeddingEngine;
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::CaptionProcessor;
pub use types::{CaptionResult, CaptionTimings};
pub use vocabulary::{Normalization, Vocabulary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
