//! Error types for the binary record codec

use thiserror::Error;

/// Codec operation result type
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while decoding fixed-layout fields
#[derive(Debug, Error)]
pub enum CodecError {
    /// Fewer bytes remain than the field declares
    #[error("truncated input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        /// Cursor offset where the read started
        offset: u64,
        /// Bytes the field requires
        needed: u64,
        /// Bytes actually available
        remaining: u64,
    },

    /// Short string length prefix points past its backing buffer
    #[error("short string length {length} exceeds capacity {capacity}")]
    ShortStringOverflow {
        /// Length byte read from the buffer
        length: usize,
        /// Characters the buffer can hold after the length byte
        capacity: usize,
    },

    /// Delphi datetime cannot be represented as a calendar date
    #[error("Delphi datetime out of range: {0}")]
    DateTimeOutOfRange(f64),

    /// I/O error while reading a stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Build a truncation error for a read of `needed` bytes at `offset`
    pub(crate) fn truncated(offset: usize, needed: usize, remaining: usize) -> Self {
        Self::TruncatedInput {
            offset: offset as u64,
            needed: needed as u64,
            remaining: remaining as u64,
        }
    }

    /// Check if this error reports missing input
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }
}
