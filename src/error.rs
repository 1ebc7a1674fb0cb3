use thiserror::Error;

/// Result type alias for disk image operations
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur when working with disk image files
#[derive(Debug, Error)]
pub enum ImageError {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structurally invalid image data
    #[error("Corrupt image at offset {offset}: {message}")]
    CorruptImage {
        /// Byte offset where the problem was detected
        offset: u64,
        /// Error message
        message: String,
    },

    /// No recognizable device or volume signature
    #[error("Not a recognized disk image format (signature {signature:#06x})")]
    UnrecognizedFormat {
        /// Signature word found at offset 0
        signature: u16,
    },

    /// Partition map holds no partition of the requested type
    #[error("No {0} partition found")]
    PartitionNotFound(String),
}

impl ImageError {
    /// Create a corrupt image error with context
    pub fn corrupt<S: Into<String>>(offset: u64, message: S) -> Self {
        ImageError::CorruptImage {
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_display() {
        let err = ImageError::corrupt(49152, "partition start beyond end of file");
        assert_eq!(
            err.to_string(),
            "Corrupt image at offset 49152: partition start beyond end of file"
        );
    }

    #[test]
    fn test_unrecognized_display() {
        let err = ImageError::UnrecognizedFormat { signature: 0x4142 };
        assert_eq!(
            err.to_string(),
            "Not a recognized disk image format (signature 0x4142)"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = ImageError::PartitionNotFound("Apple_HFS".to_string());
        assert_eq!(err.to_string(), "No Apple_HFS partition found");
    }
}
