//! Error types for segment extraction

use crate::archive::ArchiveError;
use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::header::HeaderError;
use thiserror::Error;

/// Segment extraction result type
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Errors raised by the segment orchestrator
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Header magic or version mismatch; no segments were produced
    #[error("not a game data format file: magic {magic:02X?}, version {version}")]
    NotAGameDataFormatFile {
        /// Magic bytes found
        magic: [u8; 4],
        /// Version found
        version: i32,
    },

    /// Game data entry lacks its marker
    #[error("invalid game file: expected DMLI at offset 556, found {found:?}")]
    InvalidGameFile {
        /// Bytes found at the marker offset, lossily decoded
        found: String,
    },

    /// Header fields contradict the file
    #[error("format inconsistency: {0}")]
    FormatInconsistency(String),

    /// Header field decoding failed
    #[error("header decode error: {0}")]
    Codec(#[from] CodecError),

    /// Archive indexing or extraction failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Invalid extraction settings
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HeaderError> for SegmentError {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::NotAGameDataFormatFile { magic, version } => {
                Self::NotAGameDataFormatFile { magic, version }
            }
            HeaderError::Codec(e) => Self::Codec(e),
            HeaderError::InvalidGuid(e) => Self::FormatInconsistency(e.to_string()),
            HeaderError::Io(e) => Self::Io(e),
        }
    }
}

impl SegmentError {
    /// Check if the input was rejected as not being this file type
    pub fn is_format_rejection(&self) -> bool {
        matches!(self, Self::NotAGameDataFormatFile { .. })
    }

    /// Check if the input is this file type but malformed
    pub fn is_format_error(&self) -> bool {
        match self {
            Self::InvalidGameFile { .. } | Self::FormatInconsistency(_) | Self::Codec(_) => true,
            Self::Archive(e) => e.is_format_error(),
            _ => false,
        }
    }
}
