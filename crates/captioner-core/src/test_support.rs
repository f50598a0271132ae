//! Deterministic stand-ins for the ONNX models, used by unit tests.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat};
use ndarray::Array4;

use crate::decoder::NextTokenModel;
use crate::embedding::FeatureExtractor;
use crate::error::PipelineError;
use crate::vocabulary::Vocabulary;

/// Small vocabulary: startseq=1, dog=2, endseq=3, runs=4, on=5, grass=6.
pub fn small_vocabulary() -> Vocabulary {
    Vocabulary::fit([
        "startseq dog runs on grass endseq",
        "startseq dog runs endseq",
        "startseq dog endseq",
    ])
    .unwrap()
}

/// Encode an image in memory, as an upload would arrive.
pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

/// Extractor returning a constant vector of the given length.
pub struct ConstantExtractor {
    dim: usize,
}

impl ConstantExtractor {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl FeatureExtractor for ConstantExtractor {
    fn extract(&self, _tensor: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        Ok(vec![0.5; self.dim])
    }
}

/// Extractor recording every tensor shape it is given.
pub struct ShapeRecorder {
    dim: usize,
    shapes: Arc<Mutex<Vec<Vec<usize>>>>,
}

impl ShapeRecorder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            shapes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn shapes(&self) -> Arc<Mutex<Vec<Vec<usize>>>> {
        Arc::clone(&self.shapes)
    }
}

impl FeatureExtractor for ShapeRecorder {
    fn extract(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        self.shapes.lock().unwrap().push(tensor.shape().to_vec());
        Ok(vec![0.0; self.dim])
    }
}

/// Decoder that emits a fixed token script, one token per step.
///
/// The step is derived from the number of non-padding tokens in the input,
/// so the model is a pure function of its input. Once the script runs out it
/// keeps emitting the last token.
pub struct ScriptedDecoder {
    script: Vec<u32>,
    width: usize,
    seen: Arc<Mutex<Vec<Vec<i64>>>>,
}

impl ScriptedDecoder {
    pub fn new(script: Vec<u32>, width: usize) -> Self {
        Self {
            script,
            width,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every padded sequence the decoder was queried with.
    pub fn seen(&self) -> Arc<Mutex<Vec<Vec<i64>>>> {
        Arc::clone(&self.seen)
    }
}

impl NextTokenModel for ScriptedDecoder {
    fn predict(&self, _features: &[f32], sequence: &[i64]) -> Result<Vec<f32>, PipelineError> {
        self.seen.lock().unwrap().push(sequence.to_vec());
        let step = sequence.iter().filter(|&&t| t != 0).count().saturating_sub(1);
        let token = self
            .script
            .get(step)
            .or(self.script.last())
            .copied()
            .unwrap_or(0) as usize;

        let mut probs = vec![0.01; self.width];
        if token < self.width {
            probs[token] = 0.9;
        }
        Ok(probs)
    }
}

/// Decoder that always fails.
pub struct FailingDecoder;

impl NextTokenModel for FailingDecoder {
    fn predict(&self, _features: &[f32], _sequence: &[i64]) -> Result<Vec<f32>, PipelineError> {
        Err(PipelineError::Decoder {
            message: "out of memory".to_string(),
        })
    }
}

/// Decoder that sleeps before every step and never ends the caption.
pub struct SlowDecoder {
    delay: std::time::Duration,
    width: usize,
}

impl SlowDecoder {
    pub fn new(delay: std::time::Duration, width: usize) -> Self {
        Self { delay, width }
    }
}

impl NextTokenModel for SlowDecoder {
    fn predict(&self, _features: &[f32], _sequence: &[i64]) -> Result<Vec<f32>, PipelineError> {
        std::thread::sleep(self.delay);
        let mut probs = vec![0.0; self.width];
        probs[2] = 1.0;
        Ok(probs)
    }
}
