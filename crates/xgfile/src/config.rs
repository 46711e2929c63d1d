//! Extraction configuration
//!
//! # Example
//!
//! ```rust
//! use xgfile::ExtractConfig;
//!
//! let config = ExtractConfig::default()
//!     .with_block_size(64 * 1024)
//!     .with_temp_prefix("match");
//! config.validate().expect("valid configuration");
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Default copy and checksum block size (32 KiB)
pub const DEFAULT_BLOCK_SIZE: usize = 32 * 1024;

/// Default prefix for temporary segment files
pub const DEFAULT_TEMP_PREFIX: &str = "tmpXGI";

/// Maximum inflated size of a single payload (1 GiB)
///
/// Game files are a few megabytes at most; the cap stops a crafted zlib
/// stream from filling the disk.
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: u64 = 1024 * 1024 * 1024;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Block size of zero
    #[error("block size must be greater than zero")]
    InvalidBlockSize,

    /// Decompression limit of zero
    #[error("maximum decompressed size must be greater than zero")]
    InvalidDecompressionLimit,

    /// Temporary directory does not exist or is not a directory
    #[error("temporary directory not found: {0}")]
    TempDirNotFound(PathBuf),
}

/// Settings shared by the archive reader and the segment extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Directory for temporary segment storage (OS temp dir when `None`)
    pub temp_dir: Option<PathBuf>,
    /// File-name prefix for temporary segment storage
    pub temp_prefix: String,
    /// Buffer size for copies and stream checksums
    pub block_size: usize,
    /// Upper bound on any single inflated payload
    pub max_decompressed_size: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            block_size: DEFAULT_BLOCK_SIZE,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
        }
    }
}

impl ExtractConfig {
    /// Create temporary storage under `dir`
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Set the temporary file-name prefix
    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Set the copy block size
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the inflated-size cap
    pub fn with_max_decompressed_size(mut self, limit: u64) -> Self {
        self.max_decompressed_size = limit;
        self
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - the block size or decompression limit is zero
    /// - the temporary directory is set but missing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize);
        }
        if self.max_decompressed_size == 0 {
            return Err(ConfigError::InvalidDecompressionLimit);
        }
        if let Some(dir) = &self.temp_dir
            && !dir.is_dir()
        {
            return Err(ConfigError::TempDirNotFound(dir.clone()));
        }
        Ok(())
    }
}
