//! Trailer and registry records
//!
//! Trailer (36 bytes, last block of the file):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00   | 4    | Checksum (u32) |
//! | 0x04   | 4    | Entry count (i32) |
//! | 0x08   | 4    | Format version (i32) |
//! | 0x0C   | 4    | Registry size (i32) |
//! | 0x10   | 4    | Archive data size (i32) |
//! | 0x14   | 4    | Registry compressed flag (i32) |
//! | 0x18   | 12   | Reserved |
//!
//! Registry row (532 bytes):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x000  | 256  | Name (short string) |
//! | 0x100  | 256  | Path (short string) |
//! | 0x200  | 4    | Original size (i32) |
//! | 0x204  | 4    | Compressed size (i32) |
//! | 0x208  | 4    | Start, relative to archive data (i32) |
//! | 0x20C  | 4    | Checksum (u32) |
//! | 0x210  | 1    | Compressed flag |
//! | 0x211  | 1    | Compression level |
//! | 0x212  | 2    | Padding |

use crate::codec::{CodecError, CodecResult, short_string};
use binrw::{BinRead, BinWrite};
use serde::Serialize;

/// Trailer record size in bytes
pub const TRAILER_SIZE: usize = 36;

/// Registry row size in bytes
pub const ENTRY_SIZE: usize = 532;

/// Backing buffer size of the name and path fields
pub const NAME_FIELD_SIZE: usize = 256;

/// Fixed-size record anchoring the registry at the end of the file
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite, Serialize)]
#[brw(little)]
pub struct ArchiveTrailerRecord {
    /// Archive checksum
    pub checksum: u32,
    /// Number of registry rows
    pub entry_count: i32,
    /// Archive format version
    pub version: i32,
    /// Registry byte length as stored (compressed length when compressed)
    pub registry_size: i32,
    /// Archive data region byte length
    pub archive_size: i32,
    /// Whether the registry blob is zlib-compressed
    #[br(map = |flag: i32| flag != 0)]
    #[bw(map = |flag: &bool| i32::from(*flag))]
    pub compressed_registry: bool,
    /// Reserved
    #[serde(skip)]
    pub reserved: [u8; 12],
}

/// One row of the archive registry
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite, Serialize)]
#[brw(little)]
pub struct ArchiveEntryDescriptor {
    /// Entry name, e.g. `temp.xg`
    #[br(try_map = |raw: [u8; NAME_FIELD_SIZE]| decode_name(&raw))]
    #[bw(try_map = |name: &String| encode_name(name))]
    pub name: String,
    /// Original path of the entry
    #[br(try_map = |raw: [u8; NAME_FIELD_SIZE]| decode_name(&raw))]
    #[bw(try_map = |path: &String| encode_name(path))]
    pub path: String,
    /// Size after decompression
    pub original_size: i32,
    /// Size as stored in the archive data region
    pub compressed_size: i32,
    /// Offset relative to the start of the archive data region
    pub start: i32,
    /// Entry checksum
    pub checksum: u32,
    /// Whether the payload is a zlib stream
    #[br(map = |flag: u8| flag != 0)]
    #[bw(map = |flag: &bool| u8::from(*flag))]
    pub compressed: bool,
    /// zlib level used when writing
    #[brw(pad_after = 2)]
    pub compression_level: u8,
}

impl ArchiveEntryDescriptor {
    /// Bytes the entry occupies in the archive data region
    pub fn stored_size(&self) -> i64 {
        if self.compressed {
            i64::from(self.compressed_size)
        } else {
            i64::from(self.original_size)
        }
    }

    /// End offset relative to the archive data region
    pub fn end(&self) -> i64 {
        i64::from(self.start) + self.stored_size()
    }

    /// Final path component of the name (`/` and `\` both separate)
    pub fn base_name(&self) -> &str {
        self.name.rsplit(['/', '\\']).next().unwrap_or(&self.name)
    }
}

fn decode_name(raw: &[u8; NAME_FIELD_SIZE]) -> CodecResult<String> {
    Ok(short_string(raw)?.trim_matches('\0').to_string())
}

fn encode_name(name: &str) -> CodecResult<[u8; NAME_FIELD_SIZE]> {
    let mut raw = [0u8; NAME_FIELD_SIZE];
    let mut len = 0;
    for ch in name.chars() {
        let byte = u8::try_from(u32::from(ch)).map_err(|_| CodecError::ShortStringOverflow {
            length: name.len(),
            capacity: NAME_FIELD_SIZE - 1,
        })?;
        if len == NAME_FIELD_SIZE - 1 {
            return Err(CodecError::ShortStringOverflow {
                length: name.chars().count(),
                capacity: NAME_FIELD_SIZE - 1,
            });
        }
        len += 1;
        raw[len] = byte;
    }
    raw[0] = len as u8;
    Ok(raw)
}
