//! Request pipeline components.
//!
//! This module contains the stages an uploaded image goes through:
//! - **validate**: Size and signature checks on the raw bytes
//! - **decode**: Decode the bytes with format detection and a timeout
//! - **processor**: Orchestrates validation, decoding and inference

pub mod decode;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use processor::CaptionProcessor;
pub use validate::Validator;
