//! Top-level game data format header
//!
//! Every file opens with a fixed 8232-byte header:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 4    | Magic `HMGR` |
//! | 4      | 4    | Header version (i32, must be 1) |
//! | 8      | 4    | Header size (i32) |
//! | 12     | 8    | Thumbnail offset (i64) |
//! | 20     | 4    | Thumbnail size (i32) |
//! | 24     | 16   | Game GUID (packed) |
//! | 40     | 2024 | Game name (UTF-16, 1012 units) |
//! | 2064   | 2024 | Save name |
//! | 4088   | 2024 | Level name |
//! | 6112   | 2024 | Comments |
//! | 8136   | 96   | Reserved |
//!
//! Magic and version are checked before anything else is decoded.

use crate::codec::{ByteCursor, CodecError};
use serde::Serialize;
use std::io::Read;
use thiserror::Error;
use uuid::Uuid;

/// Header magic bytes
pub const HEADER_MAGIC: [u8; 4] = *b"HMGR";

/// The only supported header version
pub const HEADER_VERSION: i32 = 1;

/// Byte length of the fixed header span
pub const HEADER_SPAN: usize = 8232;

/// Code units in each wide-string metadata field
pub const TEXT_FIELD_UNITS: usize = 1012;

/// Offset of the first wide-string field
const TEXT_FIELDS_OFFSET: usize = 40;

/// Header decoding result type
pub type HeaderResult<T> = Result<T, HeaderError>;

/// Errors raised while decoding the file header
#[derive(Debug, Error)]
pub enum HeaderError {
    /// Magic or version mismatch: the input is not this file type
    #[error("not a game data format file: magic {magic:02X?}, version {version}")]
    NotAGameDataFormatFile {
        /// Magic bytes found (zero-filled when the input is shorter)
        magic: [u8; 4],
        /// Version found (zero when the input is shorter)
        version: i32,
    },

    /// A field could not be decoded
    #[error("header field error: {0}")]
    Codec(#[from] CodecError),

    /// The GUID string of a record being built is not a GUID
    #[error("invalid GUID: {0}")]
    InvalidGuid(#[from] uuid::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded top-level header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHeaderRecord {
    /// Magic bytes, always `HMGR`
    #[serde(skip)]
    pub magic: [u8; 4],
    /// Header version, always 1
    pub version: i32,
    /// Declared header size in bytes
    pub header_size: i32,
    /// Absolute file offset of the thumbnail image
    pub thumbnail_offset: i64,
    /// Thumbnail length in bytes (0 when absent)
    pub thumbnail_size: i32,
    /// Game identifier in canonical GUID form
    pub game_guid: String,
    /// Game name
    pub game_name: String,
    /// Save name
    pub save_name: String,
    /// Level name
    pub level_name: String,
    /// Free-form comments
    pub comments: String,
}

impl FileHeaderRecord {
    /// Decode a header from the start of `data`
    ///
    /// `data` must hold the whole [`HEADER_SPAN`]; a shorter buffer that
    /// still carries a valid magic and version fails with a truncation.
    pub fn parse(data: &[u8]) -> HeaderResult<Self> {
        let mut cursor = ByteCursor::new(data);

        let (magic, version) = match (cursor.read_array::<4>(), cursor.read_i32()) {
            (Ok(magic), Ok(version)) => (magic, version),
            _ => {
                let mut magic = [0u8; 4];
                let len = data.len().min(4);
                magic[..len].copy_from_slice(&data[..len]);
                return Err(HeaderError::NotAGameDataFormatFile { magic, version: 0 });
            }
        };
        if magic != HEADER_MAGIC || version != HEADER_VERSION {
            return Err(HeaderError::NotAGameDataFormatFile { magic, version });
        }

        if data.len() < HEADER_SPAN {
            return Err(CodecError::TruncatedInput {
                offset: 0,
                needed: HEADER_SPAN as u64,
                remaining: data.len() as u64,
            }
            .into());
        }

        let header_size = cursor.read_i32()?;
        let thumbnail_offset = cursor.read_i64()?;
        let thumbnail_size = cursor.read_i32()?;
        let game_guid = cursor.read_guid()?;

        debug_assert_eq!(cursor.position(), TEXT_FIELDS_OFFSET);
        let game_name = cursor.read_utf16_fixed(TEXT_FIELD_UNITS)?;
        let save_name = cursor.read_utf16_fixed(TEXT_FIELD_UNITS)?;
        let level_name = cursor.read_utf16_fixed(TEXT_FIELD_UNITS)?;
        let comments = cursor.read_utf16_fixed(TEXT_FIELD_UNITS)?;

        Ok(Self {
            magic,
            version,
            header_size,
            thumbnail_offset,
            thumbnail_size,
            game_guid,
            game_name,
            save_name,
            level_name,
            comments,
        })
    }

    /// Encode the header back into its fixed span
    ///
    /// Text longer than a field is cut to fit with its terminator. The
    /// reserved tail is zero.
    pub fn build(&self) -> HeaderResult<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_SPAN);
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.header_size.to_le_bytes());
        out.extend_from_slice(&self.thumbnail_offset.to_le_bytes());
        out.extend_from_slice(&self.thumbnail_size.to_le_bytes());
        out.extend_from_slice(&Uuid::parse_str(&self.game_guid)?.to_bytes_le());

        for text in [
            &self.game_name,
            &self.save_name,
            &self.level_name,
            &self.comments,
        ] {
            let mut field = [0u16; TEXT_FIELD_UNITS];
            for (slot, unit) in field[..TEXT_FIELD_UNITS - 1]
                .iter_mut()
                .zip(text.encode_utf16())
            {
                *slot = unit;
            }
            for unit in field {
                out.extend_from_slice(&unit.to_le_bytes());
            }
        }

        out.resize(HEADER_SPAN, 0);
        Ok(out)
    }

    /// Whether the file embeds a thumbnail image
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_size > 0
    }
}

/// Read and decode the header from the current position of `reader`
///
/// Consumes at most [`HEADER_SPAN`] bytes.
pub fn decode_header<R: Read>(reader: &mut R) -> HeaderResult<FileHeaderRecord> {
    let mut span = Vec::with_capacity(HEADER_SPAN);
    reader.take(HEADER_SPAN as u64).read_to_end(&mut span)?;
    FileHeaderRecord::parse(&span)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn sample() -> FileHeaderRecord {
        FileHeaderRecord {
            magic: HEADER_MAGIC,
            version: HEADER_VERSION,
            header_size: HEADER_SPAN as i32,
            thumbnail_offset: HEADER_SPAN as i64,
            thumbnail_size: 1234,
            game_guid: "33221100-5544-7766-8899-aabbccddeeff".to_string(),
            game_name: "Money session".to_string(),
            save_name: "Saved \u{00E9}dition".to_string(),
            level_name: "World Class".to_string(),
            comments: String::new(),
        }
    }

    #[test]
    fn test_field_layout() {
        let data = sample().build().unwrap();
        assert_eq!(data.len(), HEADER_SPAN);
        assert_eq!(&data[0..4], b"HMGR");
        assert_eq!(&data[4..8], &1i32.to_le_bytes());
        assert_eq!(&data[12..20], &(HEADER_SPAN as i64).to_le_bytes());
        assert_eq!(&data[24..28], &[0x00, 0x11, 0x22, 0x33]);
        assert_eq!(&data[40..42], &[b'M', 0]);
        assert_eq!(&data[2064..2066], &[b'S', 0]);
        assert_eq!(&data[4088..4090], &[b'W', 0]);
        assert_eq!(&data[6112..6114], &[0, 0]);
    }

    #[test]
    fn test_parse_round_trip() {
        let header = sample();
        let parsed = FileHeaderRecord::parse(&header.build().unwrap()).unwrap();
        assert_eq!(parsed, header);
        assert!(parsed.has_thumbnail());
    }

    #[test]
    fn test_text_after_terminator_is_ignored() {
        let mut data = sample().build().unwrap();
        // Stray characters after the game name's terminator
        let tail = TEXT_FIELDS_OFFSET + 2 * 20;
        data[tail..tail + 2].copy_from_slice(&[b'X', 0]);

        let parsed = FileHeaderRecord::parse(&data).unwrap();
        assert_eq!(parsed.game_name, "Money session");
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut data = sample().build().unwrap();
        data[4..8].copy_from_slice(&2i32.to_le_bytes());
        assert!(matches!(
            FileHeaderRecord::parse(&data),
            Err(HeaderError::NotAGameDataFormatFile { version: 2, .. })
        ));
    }

    #[test]
    fn test_short_input_rejected_as_foreign() {
        assert!(matches!(
            decode_header(&mut Cursor::new(b"HMG".to_vec())),
            Err(HeaderError::NotAGameDataFormatFile { .. })
        ));
    }

    #[test]
    fn test_truncated_after_valid_magic() {
        let data = sample().build().unwrap();
        let err = decode_header(&mut Cursor::new(data[..100].to_vec())).unwrap_err();
        assert!(matches!(err, HeaderError::Codec(e) if e.is_truncation()));
    }

    #[test]
    fn test_decode_header_consumes_span_only() {
        let mut data = sample().build().unwrap();
        data.extend_from_slice(b"payload");
        let mut reader = Cursor::new(data);

        decode_header(&mut reader).unwrap();
        assert_eq!(reader.position(), HEADER_SPAN as u64);
    }

    #[test]
    fn test_long_text_is_cut_to_field() {
        let mut header = sample();
        header.comments = "x".repeat(TEXT_FIELD_UNITS + 10);
        let parsed = FileHeaderRecord::parse(&header.build().unwrap()).unwrap();
        assert_eq!(parsed.comments.len(), TEXT_FIELD_UNITS - 1);
    }

    #[test]
    fn test_serializes_without_magic() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("magic").is_none());
        assert_eq!(json["game_guid"], "33221100-5544-7766-8899-aabbccddeeff");
        assert_eq!(json["thumbnail_size"], 1234);
    }

    proptest! {
        #[test]
        fn foreign_magic_always_rejected(
            magic in prop::array::uniform4(any::<u8>()).prop_filter("not HMGR", |m| m != &HEADER_MAGIC),
            version in any::<i32>(),
        ) {
            let mut data = sample().build().unwrap();
            data[0..4].copy_from_slice(&magic);
            data[4..8].copy_from_slice(&version.to_le_bytes());
            let rejected = matches!(
                FileHeaderRecord::parse(&data),
                Err(HeaderError::NotAGameDataFormatFile { .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn wrong_version_always_rejected(version in any::<i32>().prop_filter("not 1", |v| *v != HEADER_VERSION)) {
            let mut data = sample().build().unwrap();
            data[4..8].copy_from_slice(&version.to_le_bytes());
            let rejected = matches!(
                FileHeaderRecord::parse(&data),
                Err(HeaderError::NotAGameDataFormatFile { .. })
            );
            prop_assert!(rejected);
        }
    }
}
