//! Trailer-anchored zlib archive
//!
//! The archive sits at the end of a game data file. A fixed 36-byte trailer
//! records the size of a registry (zlib-compressed or raw) that precedes it,
//! and the size of the data region that precedes the registry. Each registry
//! row locates one payload inside the data region.
//!
//! # Example
//!
//! ```no_run
//! use xgfile::archive::ArchiveReader;
//!
//! let mut reader = ArchiveReader::open("session.xg")?;
//! for entry in reader.entries().to_vec() {
//!     let bytes = reader.read_entry(&entry)?;
//!     println!("{}: {} bytes", entry.name, bytes.len());
//! }
//! # Ok::<(), xgfile::archive::ArchiveError>(())
//! ```

mod error;
mod reader;
mod record;

pub use error::{ArchiveError, ArchiveResult};
pub use reader::{ArchiveLayout, ArchiveReader};
pub use record::{
    ArchiveEntryDescriptor, ArchiveTrailerRecord, ENTRY_SIZE, NAME_FIELD_SIZE, TRAILER_SIZE,
};
