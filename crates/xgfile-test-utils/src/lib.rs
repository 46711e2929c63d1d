//! Test utilities for xgfile-rs
//!
//! Builds synthetic game data files byte by byte, so tests never depend on
//! checked-in binaries. The builders write the on-disk layout directly and
//! do not use the `xgfile` crate, which keeps them an independent oracle.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fixed header span length
pub const HEADER_SPAN: usize = 8232;

/// UTF-16 units per header text field
pub const TEXT_FIELD_UNITS: usize = 1012;

/// Registry row length
pub const ENTRY_SIZE: usize = 532;

/// Trailer length
pub const TRAILER_SIZE: usize = 36;

/// Offset of the `DMLI` marker in a game data entry
pub const GAME_FILE_MAGIC_OFFSET: usize = 556;

/// Packed GUID written by [`GameFileFixture`]
pub const FIXTURE_GUID: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
];

/// zlib-compress `data` at the default level
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("in-memory write");
    encoder.finish().expect("in-memory finish")
}

/// XOR of little-endian 32-bit words, zero-padding a trailing partial word
pub fn xor_checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0, |acc, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        acc ^ u32::from_le_bytes(word)
    })
}

/// Game data entry payload of `len` bytes with `DMLI` at offset 556
pub fn game_payload(len: usize) -> Vec<u8> {
    assert!(len >= GAME_FILE_MAGIC_OFFSET + 4, "payload too short for marker");
    let mut data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    data[GAME_FILE_MAGIC_OFFSET..GAME_FILE_MAGIC_OFFSET + 4].copy_from_slice(b"DMLI");
    data
}

fn short_string_field(text: &str) -> [u8; 256] {
    assert!(text.len() < 256, "short string too long");
    let mut field = [0u8; 256];
    field[0] = text.len() as u8;
    field[1..=text.len()].copy_from_slice(text.as_bytes());
    field
}

#[derive(Debug, Clone)]
struct FixtureEntry {
    name: String,
    payload: Vec<u8>,
    compressed: bool,
    start_override: Option<i32>,
}

/// Builder for an archive appended to arbitrary leading bytes
#[derive(Debug, Clone)]
pub struct ArchiveFixture {
    prefix: Vec<u8>,
    entries: Vec<FixtureEntry>,
    compressed_registry: bool,
}

impl ArchiveFixture {
    /// Start an archive placed after `prefix`
    pub fn new(prefix: Vec<u8>) -> Self {
        Self {
            prefix,
            entries: Vec::new(),
            compressed_registry: true,
        }
    }

    /// Append an entry, zlib-compressed when `compressed` is set
    #[must_use]
    pub fn with_entry(mut self, name: &str, payload: Vec<u8>, compressed: bool) -> Self {
        self.entries.push(FixtureEntry {
            name: name.to_string(),
            payload,
            compressed,
            start_override: None,
        });
        self
    }

    /// Store the registry uncompressed
    #[must_use]
    pub fn with_raw_registry(mut self) -> Self {
        self.compressed_registry = false;
        self
    }

    /// Record a bogus start offset for entry `index`
    #[must_use]
    pub fn with_entry_start_override(mut self, index: usize, start: i32) -> Self {
        self.entries[index].start_override = Some(start);
        self
    }

    /// Lay out prefix, data region, registry and trailer
    pub fn build(&self) -> Vec<u8> {
        let mut out = self.prefix.clone();
        let data_start = out.len();
        let mut registry = Vec::with_capacity(self.entries.len() * ENTRY_SIZE);

        for entry in &self.entries {
            let stored = if entry.compressed {
                zlib(&entry.payload)
            } else {
                entry.payload.clone()
            };
            let start = entry
                .start_override
                .unwrap_or((out.len() - data_start) as i32);

            registry.extend_from_slice(&short_string_field(&entry.name));
            registry.extend_from_slice(&short_string_field(""));
            registry.extend_from_slice(&(entry.payload.len() as i32).to_le_bytes());
            registry.extend_from_slice(&(stored.len() as i32).to_le_bytes());
            registry.extend_from_slice(&start.to_le_bytes());
            registry.extend_from_slice(&xor_checksum(&entry.payload).to_le_bytes());
            registry.push(u8::from(entry.compressed));
            registry.push(if entry.compressed { 6 } else { 0 });
            registry.extend_from_slice(&[0, 0]);

            out.extend_from_slice(&stored);
        }

        let archive_size = out.len() - data_start;
        let blob = if self.compressed_registry {
            zlib(&registry)
        } else {
            registry
        };
        out.extend_from_slice(&blob);

        let checksum = xor_checksum(&out[data_start..]);
        out.extend_from_slice(&checksum.to_le_bytes());
        out.extend_from_slice(&(self.entries.len() as i32).to_le_bytes());
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(&(blob.len() as i32).to_le_bytes());
        out.extend_from_slice(&(archive_size as i32).to_le_bytes());
        out.extend_from_slice(&i32::from(self.compressed_registry).to_le_bytes());
        out.extend_from_slice(&[0u8; 12]);
        out
    }
}

/// Builder for a complete game data file
#[derive(Debug, Clone)]
pub struct GameFileFixture {
    magic: [u8; 4],
    version: i32,
    header_size: Option<i32>,
    game_name: String,
    save_name: String,
    level_name: String,
    comments: String,
    thumbnail: Vec<u8>,
    archive: ArchiveFixture,
}

impl Default for GameFileFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl GameFileFixture {
    /// A valid header with no thumbnail and an empty archive
    pub fn new() -> Self {
        Self {
            magic: *b"HMGR",
            version: 1,
            header_size: None,
            game_name: "Fixture match".to_string(),
            save_name: "fixture".to_string(),
            level_name: "Expert".to_string(),
            comments: String::new(),
            thumbnail: Vec::new(),
            archive: ArchiveFixture::new(Vec::new()),
        }
    }

    /// Override the magic bytes
    #[must_use]
    pub fn with_magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    /// Override the header version
    #[must_use]
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Override the declared header size (defaults to the span length)
    #[must_use]
    pub fn with_header_size(mut self, size: i32) -> Self {
        self.header_size = Some(size);
        self
    }

    /// Set the game name text field
    #[must_use]
    pub fn with_game_name(mut self, name: &str) -> Self {
        self.game_name = name.to_string();
        self
    }

    /// Set the comments text field
    #[must_use]
    pub fn with_comments(mut self, comments: &str) -> Self {
        self.comments = comments.to_string();
        self
    }

    /// Embed a thumbnail right after the header
    #[must_use]
    pub fn with_thumbnail(mut self, image: Vec<u8>) -> Self {
        self.thumbnail = image;
        self
    }

    /// Append a zlib-compressed archive entry
    #[must_use]
    pub fn with_entry(mut self, name: &str, payload: Vec<u8>) -> Self {
        self.archive = self.archive.with_entry(name, payload, true);
        self
    }

    /// Append a stored archive entry
    #[must_use]
    pub fn with_stored_entry(mut self, name: &str, payload: Vec<u8>) -> Self {
        self.archive = self.archive.with_entry(name, payload, false);
        self
    }

    /// Store the registry uncompressed
    #[must_use]
    pub fn with_raw_registry(mut self) -> Self {
        self.archive = self.archive.with_raw_registry();
        self
    }

    /// The fixed header span as it will appear in the file
    pub fn header_span(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SPAN);
        let thumbnail_offset = if self.thumbnail.is_empty() {
            0i64
        } else {
            HEADER_SPAN as i64
        };
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(
            &self
                .header_size
                .unwrap_or(HEADER_SPAN as i32)
                .to_le_bytes(),
        );
        out.extend_from_slice(&thumbnail_offset.to_le_bytes());
        out.extend_from_slice(&(self.thumbnail.len() as i32).to_le_bytes());
        out.extend_from_slice(&FIXTURE_GUID);
        for text in [
            &self.game_name,
            &self.save_name,
            &self.level_name,
            &self.comments,
        ] {
            let units: Vec<u16> = text.encode_utf16().collect();
            assert!(units.len() < TEXT_FIELD_UNITS, "text field too long");
            for unit in units {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out.resize(out.len() + 2, 0);
            let field_end = 40 + ((out.len() - 40).div_ceil(2 * TEXT_FIELD_UNITS))
                * 2
                * TEXT_FIELD_UNITS;
            out.resize(field_end, 0);
        }
        out.resize(HEADER_SPAN, 0);
        out
    }

    /// The complete file contents
    pub fn build(&self) -> Vec<u8> {
        let mut prefix = self.header_span();
        prefix.extend_from_slice(&self.thumbnail);
        let mut archive = self.archive.clone();
        archive.prefix = prefix;
        archive.build()
    }

    /// Write the file into `dir`, returning its path
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("fixture.xg");
        std::fs::write(&path, self.build()).expect("write fixture");
        path
    }
}
