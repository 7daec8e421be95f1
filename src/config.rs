//! Codec configuration.

use crate::error::{Error, Result};

/// Default size of the read buffer used by both encoding passes.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default file suffix for containers written by [`crate::file::compress_file`].
pub const DEFAULT_SUFFIX: &str = ".hzip";

/// Settings shared by the streaming and file-level entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Number of bytes read from the input per chunk
    chunk_size: usize,
    /// Suffix appended to compressed file names
    suffix: String,
}

impl CodecConfig {
    /// Creates a configuration with the given read chunk size.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - Bytes read per chunk; bounds the memory of each encoding pass
    ///
    /// # Returns
    ///
    /// A new `CodecConfig` or an error if `chunk_size` is zero
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidInput(
                "Chunk size must be positive".to_string(),
            ));
        }

        Ok(CodecConfig {
            chunk_size,
            suffix: DEFAULT_SUFFIX.to_string(),
        })
    }

    /// Replaces the container file suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.suffix(), ".hzip");
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(CodecConfig::new(0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_custom_suffix() {
        let config = CodecConfig::new(16).unwrap().with_suffix(".hz");
        assert_eq!(config.chunk_size(), 16);
        assert_eq!(config.suffix(), ".hz");
    }
}
