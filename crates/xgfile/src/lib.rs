//! Reader and segment extractor for HMGR game data files
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::float_cmp)] // Binary format requirements
#![allow(clippy::derive_partial_eq_without_eq)] // Binary format structs
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! A game data file from the backgammon analyzer bundles two things:
//!
//! - a fixed 8232-byte header (magic `HMGR`, GUID, four UTF-16 text fields)
//!   optionally followed by an embedded JPEG thumbnail
//! - a trailer-anchored archive of zlib-compressed entries (game header,
//!   game history, rollouts, comments) indexed by a registry at the end of
//!   the file
//!
//! # Layers
//!
//! - [`codec`]: fixed-width little-endian fields over a byte cursor
//! - [`header`]: the top-level header record
//! - [`archive`]: trailer, registry and per-entry extraction
//! - [`segment`]: end-to-end extraction into classified temporary files
//! - [`records`]: pluggable decoding of game history records
//!
//! # Example
//!
//! ```no_run
//! use xgfile::{ExtractConfig, SegmentExtractor, SegmentKind};
//!
//! let extractor = SegmentExtractor::new(ExtractConfig::default());
//! for mut segment in extractor.extract("session.xg")? {
//!     if segment.kind() == SegmentKind::GameDataFile {
//!         let bytes = segment.read_all()?;
//!         println!("game history: {} bytes", bytes.len());
//!     }
//!     segment.discard()?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod archive;
pub mod codec;
pub mod config;
pub mod header;
pub mod records;
pub mod segment;
mod storage;

pub use archive::{ArchiveEntryDescriptor, ArchiveError, ArchiveReader, ArchiveTrailerRecord};
pub use codec::{ByteCursor, CodecError};
pub use config::{ConfigError, ExtractConfig};
pub use header::{FileHeaderRecord, HeaderError, decode_header};
pub use segment::{Segment, SegmentError, SegmentExtractor, SegmentKind, extract_segments};
pub use storage::{DetachedStorage, ScopedStorage};
