//! Binary record codec
//!
//! Every structure in the container is a fixed-byte-length record. The
//! [`ByteCursor`] decodes those records from an in-memory byte slice: each
//! read consumes exactly the declared width and fails with
//! [`CodecError::TruncatedInput`] when fewer bytes remain. All integers in
//! the format are little-endian.
//!
//! Field-level helpers live in submodules:
//! - [`text`]: fixed-capacity UTF-16 buffers, Delphi short strings, packed GUIDs
//! - [`datetime`]: Delphi `TDateTime` conversion
//! - [`checksum`]: XOR-of-words integrity tag and whole-stream checksum
//!
//! # Example
//!
//! ```rust
//! use xgfile::codec::ByteCursor;
//!
//! let data = [0x48, 0x4D, 0x47, 0x52, 0x01, 0x00, 0x00, 0x00];
//! let mut cursor = ByteCursor::new(&data);
//! assert_eq!(cursor.read_array::<4>()?, *b"HMGR");
//! assert_eq!(cursor.read_i32()?, 1);
//! assert!(cursor.read_u8().is_err());
//! # Ok::<(), xgfile::codec::CodecError>(())
//! ```

pub mod checksum;
pub mod datetime;
mod error;
pub mod text;

pub use checksum::{Checksum, stream_checksum};
pub use datetime::{delphi_datetime, delphi_epoch};
pub use error::{CodecError, CodecResult};
pub use text::{format_guid, short_string, utf16_until_nul};

use chrono::{DateTime, Utc};

/// Read cursor over a byte slice with an explicit position
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_le {
    ($(#[$doc:meta] $name:ident => $ty:ty),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name(&mut self) -> CodecResult<$ty> {
                Ok(<$ty>::from_le_bytes(self.read_array()?))
            }
        )*
    };
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the slice
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying slice
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying slice is empty
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the position and the end of the slice
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Move to an absolute offset (the end of the slice is a valid target)
    pub fn seek(&mut self, pos: usize) -> CodecResult<()> {
        if pos > self.data.len() {
            return Err(CodecError::truncated(
                self.pos,
                pos - self.pos,
                self.remaining(),
            ));
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance past `count` bytes without decoding them
    pub fn skip(&mut self, count: usize) -> CodecResult<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Borrow the next `count` bytes and advance past them
    pub fn read_bytes(&mut self, count: usize) -> CodecResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(CodecError::truncated(self.pos, count, self.remaining()));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    /// Copy the next `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read `N` signed bytes (board positions, dice)
    pub fn read_i8_array<const N: usize>(&mut self) -> CodecResult<[i8; N]> {
        Ok(self.read_array::<N>()?.map(|b| b as i8))
    }

    /// Read a single unsigned byte
    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a single signed byte
    pub fn read_i8(&mut self) -> CodecResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a one-byte boolean (any non-zero value is true)
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    read_le! {
        /// Read a little-endian `u16`
        read_u16 => u16,
        /// Read a little-endian `i16`
        read_i16 => i16,
        /// Read a little-endian `u32`
        read_u32 => u32,
        /// Read a little-endian `i32`
        read_i32 => i32,
        /// Read a little-endian `u64`
        read_u64 => u64,
        /// Read a little-endian `i64`
        read_i64 => i64,
        /// Read a little-endian IEEE-754 single
        read_f32 => f32,
        /// Read a little-endian IEEE-754 double
        read_f64 => f64,
    }

    /// Decode a fixed-capacity UTF-16 field of `units` code units
    ///
    /// The value ends at the first zero unit; whatever follows it inside
    /// the field is consumed but ignored.
    pub fn read_utf16_fixed(&mut self, units: usize) -> CodecResult<String> {
        let raw = self.read_bytes(units * 2)?;
        let code_units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(utf16_until_nul(&code_units))
    }

    /// Decode a Delphi short string stored in a `capacity`-byte buffer
    ///
    /// `capacity` includes the length byte, so `string[255]` is 256.
    pub fn read_short_string(&mut self, capacity: usize) -> CodecResult<String> {
        short_string(self.read_bytes(capacity)?)
    }

    /// Decode a Delphi `TDateTime` (little-endian double)
    pub fn read_delphi_datetime(&mut self) -> CodecResult<DateTime<Utc>> {
        let value = self.read_f64()?;
        delphi_datetime(value).ok_or(CodecError::DateTimeOutOfRange(value))
    }

    /// Decode a 16-byte packed GUID into its canonical string form
    pub fn read_guid(&mut self) -> CodecResult<String> {
        Ok(format_guid(self.read_array()?))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_advance_cursor() {
        let data = [
            0x01, // u8
            0x34, 0x12, // u16
            0xFE, 0xFF, 0xFF, 0xFF, // i32 = -2
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // u64
        ];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_u8().unwrap(), 1);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.read_i32().unwrap(), -2);
        assert_eq!(cursor.position(), 7);
        assert_eq!(cursor.read_u64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_does_not_advance() {
        let data = [0u8; 3];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(1).unwrap();

        let err = cursor.read_u32().unwrap_err();
        match err {
            CodecError::TruncatedInput {
                offset,
                needed,
                remaining,
            } => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_floats_decode_from_bit_patterns() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-0.25f64).to_le_bytes());
        let mut cursor = ByteCursor::new(&data);

        assert!((cursor.read_f32().unwrap() - 1.5).abs() < f32::EPSILON);
        assert!((cursor.read_f64().unwrap() + 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_utf16_fixed_consumes_whole_field() {
        // "AB", NUL, then a stray 'C' inside the field
        let data = [0x41, 0x00, 0x42, 0x00, 0x00, 0x00, 0x43, 0x00, 0xFF];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_utf16_fixed(4).unwrap(), "AB");
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 4];
        let mut cursor = ByteCursor::new(&data);
        cursor.seek(4).unwrap();
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.seek(5).is_err());
        cursor.seek(0).unwrap();
        assert_eq!(cursor.read_i8_array::<4>().unwrap(), [0i8; 4]);
    }
}
