//! Archive integrity tag
//!
//! The container's checksum is not CRC-32: the running value is XORed with
//! each consecutive 4-byte word of input read as a little-endian `u32`. A
//! trailing partial word is zero-padded. Words are aligned to the start of
//! the checksummed range, not to the buffers handed to [`Checksum::update`].

use super::error::{CodecError, CodecResult};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Running XOR-of-words accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checksum {
    value: u32,
    pending: [u8; 4],
    pending_len: usize,
}

impl Checksum {
    /// Create an accumulator with a zero running value
    pub const fn new() -> Self {
        Self {
            value: 0,
            pending: [0; 4],
            pending_len: 0,
        }
    }

    /// Checksum a complete buffer in one call
    pub fn checksum(data: &[u8]) -> u32 {
        let mut sum = Self::new();
        sum.update(data);
        sum.finalize()
    }

    /// Fold more input into the running value
    pub fn update(&mut self, mut data: &[u8]) {
        if self.pending_len > 0 {
            let take = (4 - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];
            if self.pending_len < 4 {
                return;
            }
            self.value ^= u32::from_le_bytes(self.pending);
            self.pending_len = 0;
        }

        let mut words = data.chunks_exact(4);
        for word in &mut words {
            self.value ^= u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        }

        let tail = words.remainder();
        self.pending[..tail.len()].copy_from_slice(tail);
        self.pending_len = tail.len();
    }

    /// Value including any zero-padded partial word
    pub fn finalize(&self) -> u32 {
        if self.pending_len == 0 {
            return self.value;
        }
        let mut word = [0u8; 4];
        word[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
        self.value ^ u32::from_le_bytes(word)
    }
}

/// Checksum a region of a seekable stream, restoring its position afterwards
///
/// Reading starts at `start` (or the current position when `None`) and
/// covers `length` bytes, or runs to end-of-stream when `length` is `None`.
/// A fixed length that runs past the end fails with
/// [`CodecError::TruncatedInput`]. The caller's position is restored on
/// success and on failure.
pub fn stream_checksum<R: Read + Seek>(
    reader: &mut R,
    start: Option<u64>,
    length: Option<u64>,
    block_size: usize,
) -> CodecResult<u32> {
    let saved = reader.stream_position()?;
    let result = checksum_region(reader, start, length, block_size.max(1));
    reader.seek(SeekFrom::Start(saved))?;
    result
}

fn checksum_region<R: Read + Seek>(
    reader: &mut R,
    start: Option<u64>,
    length: Option<u64>,
    block_size: usize,
) -> CodecResult<u32> {
    let origin = match start {
        Some(offset) => reader.seek(SeekFrom::Start(offset))?,
        None => reader.stream_position()?,
    };

    let mut sum = Checksum::new();
    let mut buffer = vec![0u8; block_size];
    let mut consumed: u64 = 0;

    loop {
        let want = match length {
            Some(total) if consumed >= total => break,
            Some(total) => (total - consumed).min(block_size as u64) as usize,
            None => block_size,
        };

        let read = match reader.read(&mut buffer[..want]) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if read == 0 {
            if let Some(total) = length {
                return Err(CodecError::TruncatedInput {
                    offset: origin + consumed,
                    needed: total - consumed,
                    remaining: 0,
                });
            }
            break;
        }

        sum.update(&buffer[..read]);
        consumed += read as u64;
    }

    Ok(sum.finalize())
}
