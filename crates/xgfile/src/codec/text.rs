//! Text and identifier fields
//!
//! - Fixed-capacity UTF-16 buffers end at the first zero code unit. Units
//!   after the terminator are not validated.
//! - Delphi short strings carry a one-byte length prefix followed by ANSI
//!   bytes; bytes past the length are not part of the value. Each byte maps
//!   to the Unicode code point of the same value (Latin-1).
//! - Packed GUIDs use the mixed-endian Windows layout: `Data1` (u32 LE),
//!   `Data2`/`Data3` (u16 LE), then 8 bytes emitted as-is.

use super::error::{CodecError, CodecResult};
use uuid::Uuid;
use widestring::U16Str;

/// Decode UTF-16 code units up to (not including) the first zero unit
///
/// Unpaired surrogates become U+FFFD.
pub fn utf16_until_nul(units: &[u16]) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    U16Str::from_slice(&units[..end]).to_string_lossy()
}

/// Decode a Delphi short string from its full backing buffer
pub fn short_string(buffer: &[u8]) -> CodecResult<String> {
    let Some((&length, body)) = buffer.split_first() else {
        return Err(CodecError::truncated(0, 1, 0));
    };
    let length = length as usize;
    if length > body.len() {
        return Err(CodecError::ShortStringOverflow {
            length,
            capacity: body.len(),
        });
    }
    Ok(body[..length].iter().copied().map(char::from).collect())
}

/// Render 16 packed bytes as `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
pub fn format_guid(bytes: [u8; 16]) -> String {
    Uuid::from_bytes_le(bytes).hyphenated().to_string()
}
