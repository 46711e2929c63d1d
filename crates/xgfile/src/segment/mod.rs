//! Segment extraction
//!
//! A game data file splits into classified segments: the verbatim header
//! span, an optional thumbnail, then one segment per archive entry in
//! registry order. Each segment is backed by its own temporary file.
//!
//! Header and thumbnail segments are [scoped](SegmentStorage::Scoped): they
//! delete their file when released or dropped. Archive segments are
//! [detached](SegmentStorage::Detached): the caller owns the file and
//! decides whether to keep it ([`Segment::release`]) or delete it
//! ([`Segment::discard`]).
//!
//! # Example
//!
//! ```no_run
//! use xgfile::segment::{SegmentKind, extract_segments};
//!
//! for segment in extract_segments("session.xg")? {
//!     println!("{}\t{}", segment.kind(), segment.path().display());
//!     if segment.kind() != SegmentKind::GameDataFile {
//!         segment.discard()?;
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod extract;
mod kind;

pub use error::{SegmentError, SegmentResult};
pub use extract::{GAME_FILE_MAGIC, GAME_FILE_MAGIC_OFFSET, SegmentExtractor, extract_segments};
pub use kind::SegmentKind;

use crate::storage::{DetachedStorage, ScopedStorage};
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Backing storage of a segment
#[derive(Debug)]
pub enum SegmentStorage {
    /// Deleted when the segment is released or dropped
    Scoped(ScopedStorage),
    /// Owned by the caller once returned
    Detached(DetachedStorage),
}

/// A classified, fully materialized byte region
#[derive(Debug)]
pub struct Segment {
    kind: SegmentKind,
    storage: SegmentStorage,
}

impl Segment {
    pub(crate) fn scoped(kind: SegmentKind, storage: ScopedStorage) -> Self {
        Self {
            kind,
            storage: SegmentStorage::Scoped(storage),
        }
    }

    pub(crate) fn detached(kind: SegmentKind, storage: DetachedStorage) -> Self {
        Self {
            kind,
            storage: SegmentStorage::Detached(storage),
        }
    }

    /// Segment classification
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        match &self.storage {
            SegmentStorage::Scoped(s) => s.path(),
            SegmentStorage::Detached(s) => s.path(),
        }
    }

    /// Whether releasing the segment deletes its backing file
    pub fn is_auto_delete(&self) -> bool {
        matches!(self.storage, SegmentStorage::Scoped(_))
    }

    /// Backing storage
    pub fn storage(&self) -> &SegmentStorage {
        &self.storage
    }

    /// Open handle on the backing file
    pub fn file_mut(&mut self) -> &mut File {
        match &mut self.storage {
            SegmentStorage::Scoped(s) => s.file_mut(),
            SegmentStorage::Detached(s) => s.file_mut(),
        }
    }

    /// Byte length of the segment
    pub fn len(&self) -> io::Result<u64> {
        Ok(fs::metadata(self.path())?.len())
    }

    /// Whether the segment holds no bytes
    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read the whole segment, leaving the handle rewound
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let file = self.file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        file.seek(SeekFrom::Start(0))?;
        Ok(data)
    }

    /// Copy the segment to `dest`, returning the bytes written
    ///
    /// The handle is rewound afterwards.
    pub fn copy_to(&mut self, dest: impl AsRef<Path>) -> io::Result<u64> {
        let mut out = File::create(dest)?;
        let file = self.file_mut();
        file.seek(SeekFrom::Start(0))?;
        let copied = io::copy(file, &mut out)?;
        out.sync_all()?;
        file.seek(SeekFrom::Start(0))?;
        Ok(copied)
    }

    /// Close the segment
    ///
    /// Scoped storage is deleted and `None` returned. Detached storage is
    /// left in place and its path returned.
    pub fn release(self) -> io::Result<Option<PathBuf>> {
        match self.storage {
            SegmentStorage::Scoped(s) => s.release().map(|()| None),
            SegmentStorage::Detached(s) => Ok(Some(s.release())),
        }
    }

    /// Close the segment and delete its backing file regardless of ownership
    pub fn discard(self) -> io::Result<()> {
        match self.storage {
            SegmentStorage::Scoped(s) => s.release(),
            SegmentStorage::Detached(s) => s.remove(),
        }
    }
}

impl Read for Segment {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file_mut().read(buf)
    }
}

impl Seek for Segment {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file_mut().seek(pos)
    }
}
