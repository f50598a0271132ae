//! VGG16 ONNX model session management and inference.
//!
//! Loads a VGG16 network truncated after its second fully-connected layer
//! and runs it to produce 4096-dimensional image feature vectors.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::{ConfigError, PipelineError};
use crate::session::lock_session;

use super::FeatureExtractor;

/// Wraps an ONNX Runtime session for VGG16 feature extraction.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct VggSession {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    /// Name of the feature output (detected from model metadata).
    output_name: String,
}

impl VggSession {
    /// Load a truncated VGG16 from an ONNX file.
    pub fn load(model_path: &Path) -> Result<Self, ConfigError> {
        let session = Session::builder()
            .map_err(|e| ConfigError::ModelLoad {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| ConfigError::ModelLoad {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| ConfigError::IncompatibleModel {
                path: model_path.to_path_buf(),
                message: "model declares no inputs".to_string(),
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
            "Loaded VGG16 feature extractor from {:?} (input: {:?}, output: {:?})",
            model_path,
            input_name,
            output_name,
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl FeatureExtractor for VggSession {
    /// Input shape: \[1, H, W, 3\] (NHWC, BGR, mean-centered).
    /// Output: the fc2 activations for the single image in the batch.
    fn extract(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| PipelineError::Embedding {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = lock_session(&self.session, "VGG16");

        let outputs = session.run(inputs).map_err(|e| PipelineError::Embedding {
            message: format!("ONNX inference failed: {e}"),
        })?;

        let features = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| PipelineError::Embedding {
                message: format!("Model did not produce {}", self.output_name),
            })?;

        let (shape, data) =
            features
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Embedding {
                    message: format!("Failed to extract {} tensor: {e}", self.output_name),
                })?;

        // fc2 is [1, 4096]; a flat [4096] export is accepted too.
        match shape.len() {
            1 => Ok(data.to_vec()),
            2 => {
                let dim = shape[1] as usize;
                Ok(data[..dim].to_vec())
            }
            _ => Err(PipelineError::Embedding {
                message: format!("Unexpected feature output shape: {:?}", shape),
            }),
        }
    }
}
