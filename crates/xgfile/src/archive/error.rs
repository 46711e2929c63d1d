//! Error types for archive operations

use crate::codec::CodecError;
use crate::config::ConfigError;
use thiserror::Error;

/// Archive operation result type
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors raised while indexing or extracting the archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Structural values contradict each other or the file size
    #[error("archive format inconsistency: {0}")]
    FormatInconsistency(String),

    /// A fixed-layout record ran past the available bytes
    #[error("archive record error: {0}")]
    Codec(#[from] CodecError),

    /// Zlib stream is corrupt or ends early
    #[error("zlib decompression failed: {0}")]
    Decompression(#[source] std::io::Error),

    /// Inflated payload exceeded the configured cap
    #[error("decompressed size exceeds limit of {limit} bytes")]
    DecompressedSizeExceeded {
        /// Configured maximum in bytes
        limit: u64,
    },

    /// No registry entry has the requested name
    #[error("entry not found in registry: {0}")]
    EntryNotFound(String),

    /// Invalid extraction settings
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Binary read/write error
    #[error("binary format error: {0}")]
    BinRw(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Shorthand for a format inconsistency
    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Self::FormatInconsistency(reason.into())
    }

    /// Check if the archive itself is malformed (as opposed to I/O trouble)
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::FormatInconsistency(_)
                | Self::Codec(_)
                | Self::Decompression(_)
                | Self::DecompressedSizeExceeded { .. }
                | Self::BinRw(_)
        )
    }
}
