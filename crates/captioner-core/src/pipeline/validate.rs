//! Input validation before decoding.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates image bytes before the full decode.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that a local file exists and is within the size limit.
    pub fn validate_path(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            input: path.display().to_string(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        self.check_size(metadata.len(), &path.display().to_string())
    }

    /// Perform quick validation of in-memory image bytes.
    ///
    /// Checks:
    /// - At least one byte was sent
    /// - Size is within limits
    /// - Bytes start with a known image signature
    pub fn validate_bytes(&self, bytes: &[u8], input: &str) -> Result<(), PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::MissingImage);
        }

        self.check_size(bytes.len() as u64, input)?;

        if bytes.len() < 4 {
            return Err(PipelineError::Decode {
                input: input.to_string(),
                message: "Too small to be a valid image".to_string(),
            });
        }

        if !Self::is_valid_image_header(bytes) {
            return Err(PipelineError::UnsupportedFormat {
                input: input.to_string(),
                format: "unrecognized (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    fn check_size(&self, size: u64, input: &str) -> Result<(), PipelineError> {
        if size > self.limits.max_file_size_bytes() {
            return Err(PipelineError::FileTooLarge {
                input: input.to_string(),
                size_mb: size / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Check if the leading bytes match known image formats.
    fn is_valid_image_header(header: &[u8]) -> bool {
        let header = &header[..header.len().min(12)];
        if header.len() < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return true;
        }

        // GIF: GIF8
        if header.starts_with(b"GIF8") {
            return true;
        }

        // WebP: RIFF....WEBP
        if header.starts_with(b"RIFF") {
            if header.len() >= 12 {
                return &header[8..12] == b"WEBP";
            }
            // Could be WebP, let the decoder decide
            return true;
        }

        // BMP: BM
        if header.starts_with(b"BM") {
            return true;
        }

        // TIFF: II (little-endian) or MM (big-endian) followed by version 42
        if header.starts_with(&[b'I', b'I', 0x2A, 0x00])
            || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
        {
            return true;
        }

        // HEIC/HEIF/AVIF: ftyp box at offset 4
        if header.len() >= 12 && &header[4..8] == b"ftyp" {
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(LimitsConfig::default())
    }

    #[test]
    fn test_magic_bytes_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_png() {
        let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert!(Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert!(Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_riff_not_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(!Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_invalid() {
        assert!(!Validator::is_valid_image_header(b"hello, world"));
    }

    #[test]
    fn test_magic_bytes_bare_ii_rejected() {
        let header = [b'I', b'I', 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(!Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_empty_bytes_are_missing_image() {
        let err = validator().validate_bytes(&[], "upload").unwrap_err();
        assert!(matches!(err, PipelineError::MissingImage));
    }

    #[test]
    fn test_text_rejected() {
        let err = validator()
            .validate_bytes(b"definitely not an image", "upload")
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_size_limit() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(1024 * 1024 + 1, 0);

        let err = Validator::new(limits).validate_bytes(&bytes, "big.jpg").unwrap_err();
        assert!(matches!(err, PipelineError::FileTooLarge { max_mb: 1, .. }));
    }

    #[test]
    fn test_missing_path() {
        let err = validator()
            .validate_path(Path::new("/nonexistent/image.jpg"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }
}
