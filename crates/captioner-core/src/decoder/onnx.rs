//! Caption decoder ONNX session.
//!
//! The exported network takes two inputs, the image feature vector and the
//! padded token sequence, and returns a softmax distribution over the
//! vocabulary for the next token.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::config::SequenceDtype;
use crate::error::{ConfigError, PipelineError};
use crate::session::lock_session;

use super::NextTokenModel;

/// Caption decoder wrapper.
///
/// Uses the same `Mutex<Session>` pattern as the feature extractor.
pub struct DecoderSession {
    session: Mutex<Session>,
    features_input: String,
    sequence_input: String,
    output_name: String,
    sequence_dtype: SequenceDtype,
}

impl DecoderSession {
    /// Load the decoder from an ONNX file.
    ///
    /// Inputs are taken in declaration order: features first, sequence second.
    pub fn load(model_path: &Path, sequence_dtype: SequenceDtype) -> Result<Self, ConfigError> {
        let session = Session::builder()
            .map_err(|e| ConfigError::ModelLoad {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| ConfigError::ModelLoad {
                path: model_path.to_path_buf(),
                message: format!("Failed to load caption decoder: {e}"),
            })?;

        let inputs: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        let [features_input, sequence_input] = <[String; 2]>::try_from(inputs).map_err(|inputs| {
            ConfigError::IncompatibleModel {
                path: model_path.to_path_buf(),
                message: format!(
                    "expected 2 inputs (features, sequence), found {}: {:?}",
                    inputs.len(),
                    inputs
                ),
            }
        })?;

        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| ConfigError::IncompatibleModel {
                path: model_path.to_path_buf(),
                message: "model declares no outputs".to_string(),
            })?;

        tracing::debug!(
            "Loaded caption decoder from {:?} (inputs: [{:?}, {:?}], output: {:?}, sequence dtype: {:?})",
            model_path,
            features_input,
            sequence_input,
            output_name,
            sequence_dtype,
        );

        Ok(Self {
            session: Mutex::new(session),
            features_input,
            sequence_input,
            output_name,
            sequence_dtype,
        })
    }
}

impl NextTokenModel for DecoderSession {
    fn predict(&self, features: &[f32], sequence: &[i64]) -> Result<Vec<f32>, PipelineError> {
        let features_value = Value::from_array((vec![1i64, features.len() as i64], features.to_vec()))
            .map_err(|e| PipelineError::Decoder {
                message: format!("Failed to create features tensor: {e}"),
            })?;
        let sequence_shape = vec![1i64, sequence.len() as i64];

        let mut session = lock_session(&self.session, "Caption decoder");

        let outputs = match self.sequence_dtype {
            SequenceDtype::Float32 => {
                let data: Vec<f32> = sequence.iter().map(|&t| t as f32).collect();
                let sequence_value = Value::from_array((sequence_shape, data)).map_err(|e| {
                    PipelineError::Decoder {
                        message: format!("Failed to create sequence tensor: {e}"),
                    }
                })?;
                session.run(ort::inputs![
                    self.features_input.as_str() => features_value,
                    self.sequence_input.as_str() => sequence_value
                ])
            }
            SequenceDtype::Int64 => {
                let sequence_value =
                    Value::from_array((sequence_shape, sequence.to_vec())).map_err(|e| {
                        PipelineError::Decoder {
                            message: format!("Failed to create sequence tensor: {e}"),
                        }
                    })?;
                session.run(ort::inputs![
                    self.features_input.as_str() => features_value,
                    self.sequence_input.as_str() => sequence_value
                ])
            }
        }
        .map_err(|e| PipelineError::Decoder {
            message: format!("Decoder inference failed: {e}"),
        })?;

        let probs = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| PipelineError::Decoder {
                message: format!("Decoder did not produce {}", self.output_name),
            })?;

        let (shape, data) = probs
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::Decoder {
                message: format!("Failed to extract {}: {e}", self.output_name),
            })?;

        // Softmax output is [1, vocab]; take the single row.
        match shape.len() {
            1 => Ok(data.to_vec()),
            2 => {
                let width = shape[1] as usize;
                Ok(data[..width].to_vec())
            }
            _ => Err(PipelineError::Decoder {
                message: format!("Unexpected decoder output shape: {:?}", shape),
            }),
        }
    }
}
