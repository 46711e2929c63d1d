//! Segment classification

use serde::Serialize;
use std::fmt;

/// What an extracted segment holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SegmentKind {
    /// Verbatim copy of the fixed header span
    HeaderRecord,
    /// Embedded thumbnail image (JPEG)
    ThumbnailImage,
    /// Archive entry `temp.xgi`
    GameHeaderFile,
    /// Archive entry `temp.xg`, the game history
    GameDataFile,
    /// Archive entry `temp.xgr`
    RolloutsFile,
    /// Archive entry `temp.xgc`
    CommentsFile,
    /// The archive registry; descriptive only, never emitted as a segment
    ArchiveIndex,
    /// Any other archive entry
    Unknown,
}

impl SegmentKind {
    /// All kinds, in declaration order
    pub const ALL: [Self; 8] = [
        Self::HeaderRecord,
        Self::ThumbnailImage,
        Self::GameHeaderFile,
        Self::GameDataFile,
        Self::RolloutsFile,
        Self::CommentsFile,
        Self::ArchiveIndex,
        Self::Unknown,
    ];

    /// Classify an archive entry by its base name
    pub fn from_entry_name(name: &str) -> Self {
        match name {
            "temp.xgi" => Self::GameHeaderFile,
            "temp.xgr" => Self::RolloutsFile,
            "temp.xgc" => Self::CommentsFile,
            "temp.xg" => Self::GameDataFile,
            _ => Self::Unknown,
        }
    }

    /// Conventional file-name suffix when the segment is written out
    pub const fn extension(self) -> &'static str {
        match self {
            Self::HeaderRecord => "_gdh.bin",
            Self::ThumbnailImage => ".jpg",
            Self::GameHeaderFile => "_gamehdr.bin",
            Self::GameDataFile => "_gamefile.bin",
            Self::RolloutsFile => "_rollouts.bin",
            Self::CommentsFile => "_comments.bin",
            Self::ArchiveIndex => "_idx.bin",
            Self::Unknown => "",
        }
    }

    /// Stable display name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeaderRecord => "HeaderRecord",
            Self::ThumbnailImage => "ThumbnailImage",
            Self::GameHeaderFile => "GameHeaderFile",
            Self::GameDataFile => "GameDataFile",
            Self::RolloutsFile => "RolloutsFile",
            Self::CommentsFile => "CommentsFile",
            Self::ArchiveIndex => "ArchiveIndex",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
