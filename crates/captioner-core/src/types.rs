//! Core data types produced by the captioning pipeline.

use serde::{Deserialize, Serialize};

/// Caption and action word for one image.
///
/// Serializes to the `/predict` response body: `{"caption": ..., "action": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionResult {
    /// Generated caption, markers stripped
    pub caption: String,

    /// Capitalized action word picked from the caption
    pub action: String,
}

/// Timing breakdown for a single captioning request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CaptionTimings {
    /// Time spent decoding the image bytes
    pub decode_ms: u64,

    /// Time spent on feature extraction and caption decoding
    pub inference_ms: u64,
}

impl CaptionTimings {
    /// Total wall time across stages.
    pub fn total_ms(&self) -> u64 {
        self.decode_ms + self.inference_ms
    }
}
