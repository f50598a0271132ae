//! Image decoding with format detection, validation, and timeout support.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Encoded size in bytes
    pub byte_size: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an image from an in-memory byte buffer with validation and timeout.
    ///
    /// `input` names the source in error messages (file name or upload name).
    pub async fn decode_bytes(
        &self,
        bytes: Vec<u8>,
        input: &str,
    ) -> Result<DecodedImage, PipelineError> {
        let input_owned = input.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &input_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        input: input.to_string(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                input: input.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                input: input.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, input: &str) -> Result<DecodedImage, PipelineError> {
        use std::io::Cursor;

        let byte_size = bytes.len() as u64;
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                input: input.to_string(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = reader
            .format()
            .ok_or_else(|| PipelineError::UnsupportedFormat {
                input: input.to_string(),
                format: "unknown".to_string(),
            })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            input: input.to_string(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            byte_size,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}
