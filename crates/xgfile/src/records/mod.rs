//! Game history record decoding
//!
//! The game data entry is a sequence of tagged records. Their tag is a
//! closed [`EntryType`], and decoding is pluggable: a [`RecordRegistry`]
//! maps each tag to a decode function over the same [`ByteCursor`] the
//! container codec uses, so new record shapes are added by registration
//! rather than by touching the archive or segment code.
//!
//! The fixed engine structures embedded in those records live in
//! [`engine`].
//!
//! # Example
//!
//! ```rust
//! use xgfile::codec::{ByteCursor, CodecResult};
//! use xgfile::records::{EntryType, RecordRegistry};
//!
//! fn cube_value(cursor: &mut ByteCursor<'_>) -> CodecResult<i32> {
//!     cursor.read_i32()
//! }
//!
//! let registry = RecordRegistry::new().with(EntryType::Cube, cube_value);
//! let data = 2i32.to_le_bytes();
//! let value = registry.decode(EntryType::Cube, &mut ByteCursor::new(&data))?;
//! assert_eq!(value, 2);
//! # Ok::<(), xgfile::records::RecordError>(())
//! ```

pub mod engine;

pub use engine::{BestMoveRecord, DoubleActionRecord, EvalLevel, TimeSetting};

use crate::codec::{ByteCursor, CodecError, CodecResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Record decoding result type
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors raised while decoding game history records
#[derive(Debug, Error)]
pub enum RecordError {
    /// Tag outside the known range
    #[error("unknown entry type tag {0}")]
    UnknownEntryType(i32),

    /// No decoder registered for the tag
    #[error("no decoder registered for {0}")]
    Unregistered(EntryType),

    /// Field decoding failed
    #[error("record decode error: {0}")]
    Codec(#[from] CodecError),
}

/// Game history record tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntryType {
    /// Match header
    HeaderMatch,
    /// Game header
    HeaderGame,
    /// Cube action
    Cube,
    /// Checker play
    Move,
    /// Game footer
    FooterGame,
    /// Match footer
    FooterMatch,
    /// Placeholder for a missing record
    Missing,
}

impl EntryType {
    /// Map a stored tag to its type
    pub fn from_tag(tag: i32) -> RecordResult<Self> {
        match tag {
            0 => Ok(Self::HeaderMatch),
            1 => Ok(Self::HeaderGame),
            2 => Ok(Self::Cube),
            3 => Ok(Self::Move),
            4 => Ok(Self::FooterGame),
            5 => Ok(Self::FooterMatch),
            6 => Ok(Self::Missing),
            other => Err(RecordError::UnknownEntryType(other)),
        }
    }

    /// Stored tag value
    pub const fn tag(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for EntryType {
    type Error = RecordError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        Self::from_tag(tag)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decode function for one record shape
pub type DecodeFn<T> = fn(&mut ByteCursor<'_>) -> CodecResult<T>;

/// Maps record tags to decode functions producing `T`
#[derive(Debug, Clone)]
pub struct RecordRegistry<T> {
    decoders: HashMap<EntryType, DecodeFn<T>>,
}

impl<T> Default for RecordRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a decoder, returning the one it replaces
    pub fn register(&mut self, entry_type: EntryType, decode: DecodeFn<T>) -> Option<DecodeFn<T>> {
        self.decoders.insert(entry_type, decode)
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, entry_type: EntryType, decode: DecodeFn<T>) -> Self {
        self.register(entry_type, decode);
        self
    }

    /// Whether a decoder is registered for `entry_type`
    pub fn contains(&self, entry_type: EntryType) -> bool {
        self.decoders.contains_key(&entry_type)
    }

    /// Decode one record of `entry_type` at the cursor position
    pub fn decode(&self, entry_type: EntryType, cursor: &mut ByteCursor<'_>) -> RecordResult<T> {
        let decode = self
            .decoders
            .get(&entry_type)
            .ok_or(RecordError::Unregistered(entry_type))?;
        Ok(decode(cursor)?)
    }

    /// Decode one record whose type is given by a stored tag
    pub fn decode_tagged(&self, tag: i32, cursor: &mut ByteCursor<'_>) -> RecordResult<T> {
        self.decode(EntryType::from_tag(tag)?, cursor)
    }
}
