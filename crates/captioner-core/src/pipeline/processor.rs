//! Pipeline orchestration - wires together all request stages.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::config::{Config, LimitsConfig};
use crate::context::InferenceContext;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{CaptionResult, CaptionTimings};

use super::decode::{format_to_string, ImageDecoder};
use super::validate::Validator;

/// Turns raw image bytes into a caption.
///
/// Cheap to clone; clones share the same inference context.
#[derive(Clone)]
pub struct CaptionProcessor {
    context: Arc<InferenceContext>,
    decoder: ImageDecoder,
    validator: Validator,
    limits: LimitsConfig,
}

impl CaptionProcessor {
    /// Create a processor around a loaded inference context.
    pub fn new(context: Arc<InferenceContext>, config: &Config) -> Self {
        Self {
            context,
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            limits: config.limits.clone(),
        }
    }

    pub fn context(&self) -> &InferenceContext {
        &self.context
    }

    /// Caption an in-memory image.
    ///
    /// `input` names the source in errors and logs.
    pub async fn process_bytes(&self, bytes: Vec<u8>, input: &str) -> PipelineResult<CaptionResult> {
        self.process_bytes_timed(bytes, input)
            .await
            .map(|(result, _)| result)
    }

    /// Caption an in-memory image and report per-stage timings.
    pub async fn process_bytes_timed(
        &self,
        bytes: Vec<u8>,
        input: &str,
    ) -> PipelineResult<(CaptionResult, CaptionTimings)> {
        // Validate
        self.validator.validate_bytes(&bytes, input)?;

        // Decode
        let decode_start = Instant::now();
        let decoded = self.decoder.decode_bytes(bytes, input).await?;
        let decode_time = decode_start.elapsed();
        tracing::trace!("  Decode: {:?}", decode_time);
        tracing::debug!(
            "Decoded {} ({}x{} {}, {} bytes)",
            input,
            decoded.width,
            decoded.height,
            format_to_string(decoded.format),
            decoded.byte_size
        );

        // Embed + caption
        let inference_start = Instant::now();
        let context = Arc::clone(&self.context);
        let image = decoded.image;
        let inference = timeout(
            Duration::from_millis(self.limits.inference_timeout_ms),
            tokio::task::spawn_blocking(move || context.caption_image(&image)),
        )
        .await;

        let result = match inference {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(PipelineError::Decoder {
                    message: format!("Inference task failed: {}", e),
                })
            }
            Err(_) => {
                return Err(PipelineError::Timeout {
                    input: input.to_string(),
                    stage: "inference".to_string(),
                    timeout_ms: self.limits.inference_timeout_ms,
                })
            }
        };
        let inference_time = inference_start.elapsed();
        tracing::trace!("  Inference: {:?}", inference_time);

        let timings = CaptionTimings {
            decode_ms: decode_time.as_millis() as u64,
            inference_ms: inference_time.as_millis() as u64,
        };
        tracing::debug!("Captioned {} in {}ms", input, timings.total_ms());

        Ok((result, timings))
    }

    /// Caption an image file on disk.
    pub async fn process_path(&self, path: &Path) -> PipelineResult<CaptionResult> {
        self.validator.validate_path(path)?;

        let input = path.display().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                input: input.clone(),
                message: format!("Cannot read file: {}", e),
            })?;

        self.process_bytes(bytes, &input).await
    }
}
