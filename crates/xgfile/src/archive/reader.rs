//! Trailer-anchored archive reader
//!
//! The archive occupies the tail of the file:
//!
//! ```text
//! [ ... header / thumbnail ... ][ archive data ][ registry ][ trailer ]
//!                               ^data_start     ^registry_start        ^file_length
//! ```
//!
//! Only the trailer's position is fixed (the last 36 bytes). The registry
//! start and the data start are back-computed from the sizes it records.

use super::error::{ArchiveError, ArchiveResult};
use super::record::{ArchiveEntryDescriptor, ArchiveTrailerRecord, ENTRY_SIZE, TRAILER_SIZE};
use crate::codec::CodecError;
use crate::config::ExtractConfig;
use crate::storage::{self, DetachedStorage};
use binrw::BinRead;
use flate2::read::ZlibDecoder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info};

/// Absolute offsets derived from the trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveLayout {
    /// Total input length
    pub file_length: u64,
    /// Offset of the trailer record
    pub trailer_offset: u64,
    /// Offset of the registry blob
    pub registry_start: u64,
    /// Offset of the archive data region
    pub data_start: u64,
}

impl ArchiveLayout {
    /// Back-compute the region offsets from a trailer
    pub fn compute(file_length: u64, trailer: &ArchiveTrailerRecord) -> ArchiveResult<Self> {
        let trailer_offset = file_length
            .checked_sub(TRAILER_SIZE as u64)
            .ok_or_else(|| CodecError::TruncatedInput {
                offset: 0,
                needed: TRAILER_SIZE as u64,
                remaining: file_length,
            })?;

        let registry_size = u64::try_from(trailer.registry_size).map_err(|_| {
            ArchiveError::inconsistent(format!(
                "negative registry size {}",
                trailer.registry_size
            ))
        })?;
        let archive_size = u64::try_from(trailer.archive_size).map_err(|_| {
            ArchiveError::inconsistent(format!("negative archive size {}", trailer.archive_size))
        })?;
        if trailer.entry_count < 0 {
            return Err(ArchiveError::inconsistent(format!(
                "negative entry count {}",
                trailer.entry_count
            )));
        }

        let registry_start = trailer_offset.checked_sub(registry_size).ok_or_else(|| {
            ArchiveError::inconsistent(format!(
                "registry of {registry_size} bytes does not fit before trailer at {trailer_offset}"
            ))
        })?;
        let data_start = registry_start.checked_sub(archive_size).ok_or_else(|| {
            ArchiveError::inconsistent(format!(
                "archive data of {archive_size} bytes does not fit before registry at {registry_start}"
            ))
        })?;

        Ok(Self {
            file_length,
            trailer_offset,
            registry_start,
            data_start,
        })
    }

    /// Length of the archive data region
    pub fn data_len(&self) -> u64 {
        self.registry_start - self.data_start
    }
}

/// Reader over an archive-bearing stream
///
/// The registry is parsed eagerly, so a malformed trailer or registry fails
/// construction rather than the first extraction. Each extraction re-seeks
/// the shared stream, so entries can be extracted in any order, but only
/// one caller at a time.
#[derive(Debug)]
pub struct ArchiveReader<R> {
    reader: R,
    trailer: ArchiveTrailerRecord,
    layout: ArchiveLayout,
    entries: Vec<ArchiveEntryDescriptor>,
    config: ExtractConfig,
}

impl ArchiveReader<BufReader<File>> {
    /// Open a file and index its archive with default settings
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        Self::open_with_config(path, ExtractConfig::default())
    }

    /// Open a file and index its archive
    pub fn open_with_config(path: impl AsRef<Path>, config: ExtractConfig) -> ArchiveResult<Self> {
        let path = path.as_ref();
        debug!("Opening archive {}", path.display());
        let file = File::open(path)?;
        Self::with_config(BufReader::with_capacity(config.block_size.max(1), file), config)
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Index an archive held by any seekable reader
    pub fn new(reader: R) -> ArchiveResult<Self> {
        Self::with_config(reader, ExtractConfig::default())
    }

    /// Index an archive held by any seekable reader
    pub fn with_config(mut reader: R, config: ExtractConfig) -> ArchiveResult<Self> {
        config.validate()?;

        let saved = reader.stream_position()?;
        let indexed = Self::load_index(&mut reader, &config);
        reader.seek(SeekFrom::Start(saved))?;
        let (trailer, layout, entries) = indexed?;

        info!(
            "Archive indexed: {} entries, registry {} bytes ({}), data {} bytes at {}",
            entries.len(),
            trailer.registry_size,
            if trailer.compressed_registry {
                "compressed"
            } else {
                "raw"
            },
            layout.data_len(),
            layout.data_start
        );

        Ok(Self {
            reader,
            trailer,
            layout,
            entries,
            config,
        })
    }

    fn load_index(
        reader: &mut R,
        config: &ExtractConfig,
    ) -> ArchiveResult<(
        ArchiveTrailerRecord,
        ArchiveLayout,
        Vec<ArchiveEntryDescriptor>,
    )> {
        let (trailer, layout) = Self::locate_index(reader)?;
        let entries = Self::decode_registry(reader, &trailer, &layout, config)?;
        Ok((trailer, layout, entries))
    }

    /// Read the trailer and derive the region offsets
    ///
    /// The reader's position is restored before returning.
    pub fn locate_index(reader: &mut R) -> ArchiveResult<(ArchiveTrailerRecord, ArchiveLayout)> {
        let saved = reader.stream_position()?;
        let located = Self::read_trailer(reader);
        reader.seek(SeekFrom::Start(saved))?;
        located
    }

    fn read_trailer(reader: &mut R) -> ArchiveResult<(ArchiveTrailerRecord, ArchiveLayout)> {
        let file_length = reader.seek(SeekFrom::End(0))?;
        if file_length < TRAILER_SIZE as u64 {
            return Err(CodecError::TruncatedInput {
                offset: 0,
                needed: TRAILER_SIZE as u64,
                remaining: file_length,
            }
            .into());
        }

        reader.seek(SeekFrom::Start(file_length - TRAILER_SIZE as u64))?;
        let trailer = ArchiveTrailerRecord::read(reader)?;
        debug!(
            "Trailer: count={} version={} registry_size={} archive_size={} compressed={} checksum={:08x}",
            trailer.entry_count,
            trailer.version,
            trailer.registry_size,
            trailer.archive_size,
            trailer.compressed_registry,
            trailer.checksum
        );

        let layout = ArchiveLayout::compute(file_length, &trailer)?;
        Ok((trailer, layout))
    }

    /// Materialize the registry blob and decode its rows
    ///
    /// Every row is checked against the archive data region. The reader is
    /// left positioned wherever the registry read stopped.
    pub fn decode_registry(
        reader: &mut R,
        trailer: &ArchiveTrailerRecord,
        layout: &ArchiveLayout,
        config: &ExtractConfig,
    ) -> ArchiveResult<Vec<ArchiveEntryDescriptor>> {
        let registry_len = layout.trailer_offset - layout.registry_start;
        reader.seek(SeekFrom::Start(layout.registry_start))?;

        let mut blob = Vec::new();
        if trailer.compressed_registry {
            inflate_into(
                reader.by_ref().take(registry_len),
                &mut blob,
                config.max_decompressed_size,
                config.block_size,
            )?;
        } else {
            reader.by_ref().take(registry_len).read_to_end(&mut blob)?;
        }

        let count = trailer.entry_count as usize;
        let needed = count * ENTRY_SIZE;
        if blob.len() < needed {
            return Err(CodecError::TruncatedInput {
                offset: 0,
                needed: needed as u64,
                remaining: blob.len() as u64,
            }
            .into());
        }

        let mut cursor = Cursor::new(&blob);
        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let entry = ArchiveEntryDescriptor::read(&mut cursor)?;
            validate_entry(index, &entry, layout)?;
            debug!(
                "Registry[{index}]: {} start={} csize={} osize={} compressed={}",
                entry.name, entry.start, entry.compressed_size, entry.original_size, entry.compressed
            );
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The decoded trailer
    pub fn trailer(&self) -> &ArchiveTrailerRecord {
        &self.trailer
    }

    /// Region offsets
    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// Registry rows in stored order
    pub fn entries(&self) -> &[ArchiveEntryDescriptor] {
        &self.entries
    }

    /// Settings in effect
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Look up a registry row by exact name
    pub fn find(&self, name: &str) -> Option<&ArchiveEntryDescriptor> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Stream an entry's payload into `sink`, returning the bytes written
    ///
    /// Compressed entries are inflated until the zlib end-of-stream marker
    /// (never reading past the data region) and must produce exactly
    /// `original_size` bytes. Stored entries copy exactly
    /// `compressed_size` bytes, which must be positive.
    pub fn extract_to<W: Write>(
        &mut self,
        entry: &ArchiveEntryDescriptor,
        sink: &mut W,
    ) -> ArchiveResult<u64> {
        validate_entry_bounds(entry, &self.layout)?;
        let offset = self.layout.data_start + entry.start as u64;
        let region_left = self.layout.registry_start - offset;
        self.reader.seek(SeekFrom::Start(offset))?;

        if entry.compressed {
            let written = inflate_into(
                self.reader.by_ref().take(region_left),
                sink,
                self.config.max_decompressed_size,
                self.config.block_size,
            )?;
            if written != entry.original_size as u64 {
                return Err(ArchiveError::inconsistent(format!(
                    "entry {} inflated to {written} bytes, registry says {}",
                    entry.name, entry.original_size
                )));
            }
            Ok(written)
        } else {
            if entry.compressed_size <= 0 {
                return Err(ArchiveError::inconsistent(format!(
                    "stored entry {} has non-positive byte count {}",
                    entry.name, entry.compressed_size
                )));
            }
            let count = entry.compressed_size as u64;
            if count > region_left {
                return Err(ArchiveError::inconsistent(format!(
                    "stored entry {} runs {} bytes past the archive data region",
                    entry.name,
                    count - region_left
                )));
            }
            let copied =
                storage::copy_exact(&mut self.reader, sink, count, self.config.block_size)?;
            if copied < count {
                return Err(CodecError::TruncatedInput {
                    offset: offset + copied,
                    needed: count - copied,
                    remaining: 0,
                }
                .into());
            }
            Ok(copied)
        }
    }

    /// Extract an entry into memory
    pub fn read_entry(&mut self, entry: &ArchiveEntryDescriptor) -> ArchiveResult<Vec<u8>> {
        let mut out = Vec::new();
        self.extract_to(entry, &mut out)?;
        Ok(out)
    }

    /// Extract an entry into caller-owned temporary storage
    ///
    /// The storage is fully written and rewound before it is returned. If
    /// extraction fails, the partial temporary file is deleted.
    pub fn extract(&mut self, entry: &ArchiveEntryDescriptor) -> ArchiveResult<DetachedStorage> {
        let mut temp = storage::new_temp_file(&self.config)?;
        let written = {
            let mut sink = BufWriter::with_capacity(self.config.block_size, temp.as_file_mut());
            let written = self.extract_to(entry, &mut sink)?;
            sink.flush()?;
            written
        };
        let storage = DetachedStorage::from_temp(temp)?;
        debug!(
            "Extracted {} ({written} bytes) to {}",
            entry.name,
            storage.path().display()
        );
        Ok(storage)
    }

    /// Extract an entry by name into caller-owned temporary storage
    pub fn extract_by_name(&mut self, name: &str) -> ArchiveResult<DetachedStorage> {
        let entry = self
            .find(name)
            .cloned()
            .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))?;
        self.extract(&entry)
    }

    /// Release the reader, returning the underlying stream
    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn validate_entry_bounds(entry: &ArchiveEntryDescriptor, layout: &ArchiveLayout) -> ArchiveResult<()> {
    if entry.start < 0 || entry.original_size < 0 || entry.compressed_size < 0 {
        return Err(ArchiveError::inconsistent(format!(
            "entry {} has negative start or size",
            entry.name
        )));
    }
    if entry.end() as u64 > layout.data_len() {
        return Err(ArchiveError::inconsistent(format!(
            "entry {} ends at {} past archive data length {}",
            entry.name,
            entry.end(),
            layout.data_len()
        )));
    }
    Ok(())
}

fn validate_entry(
    index: usize,
    entry: &ArchiveEntryDescriptor,
    layout: &ArchiveLayout,
) -> ArchiveResult<()> {
    validate_entry_bounds(entry, layout).map_err(|e| match e {
        ArchiveError::FormatInconsistency(reason) => {
            ArchiveError::FormatInconsistency(format!("registry row {index}: {reason}"))
        }
        other => other,
    })
}

/// Inflate a zlib stream into `sink`, enforcing `limit`
fn inflate_into<R: Read, W: Write>(
    source: R,
    sink: &mut W,
    limit: u64,
    block_size: usize,
) -> ArchiveResult<u64> {
    let mut decoder = ZlibDecoder::new(source);
    let mut buffer = vec![0u8; block_size.max(1)];
    let mut written = 0u64;
    loop {
        let read = match decoder.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::Decompression(e)),
        };
        if written + read as u64 > limit {
            return Err(ArchiveError::DecompressedSizeExceeded { limit });
        }
        sink.write_all(&buffer[..read])?;
        written += read as u64;
    }
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use xgfile_test_utils::{ArchiveFixture, zlib};

    fn sample() -> ArchiveFixture {
        ArchiveFixture::new(vec![0xAB; 100])
            .with_entry("temp.xgi", b"game header".to_vec(), true)
            .with_entry("temp.xg", vec![0x5A; 4000], true)
            .with_entry("notes.txt", b"stored verbatim".to_vec(), false)
    }

    #[test]
    fn test_layout_back_computation() {
        let fixture = sample();
        let data = fixture.build();
        let reader = ArchiveReader::new(Cursor::new(data.clone())).unwrap();
        let layout = reader.layout();

        assert_eq!(layout.file_length, data.len() as u64);
        assert_eq!(layout.trailer_offset, (data.len() - TRAILER_SIZE) as u64);
        assert_eq!(
            layout.registry_start,
            layout.trailer_offset - reader.trailer().registry_size as u64
        );
        assert_eq!(layout.data_start, 100);
        assert_eq!(reader.trailer().entry_count, 3);
    }

    #[test]
    fn test_registry_order_and_fields() {
        let reader = ArchiveReader::new(Cursor::new(sample().build())).unwrap();
        let names: Vec<_> = reader.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["temp.xgi", "temp.xg", "notes.txt"]);

        let xg = reader.find("temp.xg").unwrap();
        assert!(xg.compressed);
        assert_eq!(xg.original_size, 4000);
        assert!(xg.compressed_size < 4000);
    }

    #[test]
    fn test_raw_registry() {
        let data = sample().with_raw_registry().build();
        let reader = ArchiveReader::new(Cursor::new(data)).unwrap();
        assert!(!reader.trailer().compressed_registry);
        assert_eq!(reader.entries().len(), 3);
    }

    #[test]
    fn test_index_parsing_restores_position() {
        let mut stream = Cursor::new(sample().build());
        stream.set_position(42);
        let (trailer, _) = ArchiveReader::locate_index(&mut stream).unwrap();
        assert_eq!(trailer.entry_count, 3);
        assert_eq!(stream.position(), 42);

        let reader = ArchiveReader::new(stream).unwrap();
        assert_eq!(reader.into_inner().position(), 42);
    }

    #[test]
    fn test_extract_out_of_order() {
        let mut reader = ArchiveReader::new(Cursor::new(sample().build())).unwrap();
        let entries = reader.entries().to_vec();

        assert_eq!(reader.read_entry(&entries[2]).unwrap(), b"stored verbatim");
        assert_eq!(reader.read_entry(&entries[0]).unwrap(), b"game header");
        assert_eq!(reader.read_entry(&entries[1]).unwrap(), vec![0x5A; 4000]);
        assert_eq!(reader.read_entry(&entries[0]).unwrap(), b"game header");
    }

    #[test]
    fn test_extract_to_temp_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExtractConfig::default().with_temp_dir(dir.path());
        let mut reader = ArchiveReader::with_config(Cursor::new(sample().build()), config).unwrap();

        let mut storage = reader.extract_by_name("temp.xgi").unwrap();
        let mut contents = Vec::new();
        storage.file_mut().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"game header");
        assert!(storage.path().starts_with(dir.path()));

        storage.remove().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unknown_name() {
        let mut reader = ArchiveReader::new(Cursor::new(sample().build())).unwrap();
        assert!(matches!(
            reader.extract_by_name("missing"),
            Err(ArchiveError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_zero_length_stored_entry_rejected() {
        let data = ArchiveFixture::new(Vec::new())
            .with_entry("empty", Vec::new(), false)
            .build();
        let mut reader = ArchiveReader::new(Cursor::new(data)).unwrap();
        let entry = reader.entries()[0].clone();
        assert!(matches!(
            reader.read_entry(&entry),
            Err(ArchiveError::FormatInconsistency(_))
        ));
    }

    #[test]
    fn test_failed_extraction_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = ArchiveFixture::new(Vec::new())
            .with_entry("empty", Vec::new(), false)
            .build();
        let config = ExtractConfig::default().with_temp_dir(dir.path());
        let mut reader = ArchiveReader::with_config(Cursor::new(data), config).unwrap();

        assert!(reader.extract_by_name("empty").is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_file_shorter_than_trailer() {
        let err = ArchiveReader::new(Cursor::new(vec![0u8; 10])).unwrap_err();
        assert!(matches!(err, ArchiveError::Codec(e) if e.is_truncation()));
    }

    #[test]
    fn test_registry_larger_than_file() {
        let mut data = sample().build();
        let at = data.len() - TRAILER_SIZE + 12;
        data[at..at + 4].copy_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(
            ArchiveReader::new(Cursor::new(data)),
            Err(ArchiveError::FormatInconsistency(_))
        ));
    }

    #[test]
    fn test_entry_count_beyond_registry() {
        let mut data = sample().with_raw_registry().build();
        let at = data.len() - TRAILER_SIZE + 4;
        data[at..at + 4].copy_from_slice(&4i32.to_le_bytes());
        let err = ArchiveReader::new(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, ArchiveError::Codec(e) if e.is_truncation()));
    }

    #[test]
    fn test_entry_past_data_region_rejected() {
        let fixture = sample().with_entry_start_override(1, 10_000);
        assert!(matches!(
            ArchiveReader::new(Cursor::new(fixture.build())),
            Err(ArchiveError::FormatInconsistency(_))
        ));
    }

    /// Overwrite an i32 field of registry row `index` in a raw-registry build
    fn patch_row(data: &mut [u8], index: usize, field: usize, value: i32) {
        let registry_size = 3 * ENTRY_SIZE;
        let at = data.len() - TRAILER_SIZE - registry_size + index * ENTRY_SIZE + field;
        data[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    const ORIGINAL_SIZE_FIELD: usize = 0x200;
    const COMPRESSED_SIZE_FIELD: usize = 0x204;
    const START_FIELD: usize = 0x208;

    #[test]
    fn test_inflated_length_mismatch() {
        let mut data = sample().with_raw_registry().build();
        patch_row(&mut data, 0, ORIGINAL_SIZE_FIELD, 999);
        let mut reader = ArchiveReader::new(Cursor::new(data)).unwrap();
        let entry = reader.entries()[0].clone();

        match reader.read_entry(&entry) {
            Err(ArchiveError::FormatInconsistency(reason)) => {
                assert_eq!(reason, "entry temp.xgi inflated to 11 bytes, registry says 999");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_negative_row_fields_rejected() {
        for field in [ORIGINAL_SIZE_FIELD, COMPRESSED_SIZE_FIELD, START_FIELD] {
            let mut data = sample().with_raw_registry().build();
            patch_row(&mut data, 0, field, -1);
            match ArchiveReader::new(Cursor::new(data)) {
                Err(ArchiveError::FormatInconsistency(reason)) => {
                    assert_eq!(
                        reason,
                        "registry row 0: entry temp.xgi has negative start or size"
                    );
                }
                other => panic!("field {field:#x}: unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_negative_trailer_fields_rejected() {
        // entry count, registry size, archive size
        for field in [4, 12, 16] {
            let mut data = sample().build();
            let at = data.len() - TRAILER_SIZE + field;
            data[at..at + 4].copy_from_slice(&(-1i32).to_le_bytes());
            assert!(
                matches!(
                    ArchiveReader::new(Cursor::new(data)),
                    Err(ArchiveError::FormatInconsistency(_))
                ),
                "trailer field at {field}"
            );
        }
    }

    #[test]
    fn test_corrupt_zlib_payload() {
        let mut data = sample().build();
        // Clobber the zlib header of the first entry
        data[100] = 0xFF;
        data[101] = 0xFF;
        let mut reader = ArchiveReader::new(Cursor::new(data)).unwrap();
        let entry = reader.entries()[0].clone();
        assert!(matches!(
            reader.read_entry(&entry),
            Err(ArchiveError::Decompression(_))
        ));
    }

    #[test]
    fn test_decompression_limit() {
        // Registry inflates to 3 * 532 bytes, temp.xg to 4000
        let config = ExtractConfig::default().with_max_decompressed_size(2000);
        let mut reader = ArchiveReader::with_config(Cursor::new(sample().build()), config).unwrap();
        let header = reader.entries()[0].clone();
        assert_eq!(reader.read_entry(&header).unwrap(), b"game header");

        let entry = reader.find("temp.xg").cloned().unwrap();
        assert!(matches!(
            reader.read_entry(&entry),
            Err(ArchiveError::DecompressedSizeExceeded { limit: 2000 })
        ));
    }

    #[test]
    fn test_decompression_limit_applies_to_registry() {
        let config = ExtractConfig::default().with_max_decompressed_size(1000);
        assert!(matches!(
            ArchiveReader::with_config(Cursor::new(sample().build()), config),
            Err(ArchiveError::DecompressedSizeExceeded { limit: 1000 })
        ));
    }

    #[test]
    fn test_inflate_helper() {
        let packed = zlib(b"hello hello hello");
        let mut out = Vec::new();
        let n = inflate_into(Cursor::new(packed), &mut out, 1024, 4).unwrap();
        assert_eq!(n, 17);
        assert_eq!(out, b"hello hello hello");
    }

    proptest! {
        /// Well-formed archives keep every payload inside the data region
        #[test]
        fn entries_stay_inside_data_region(
            payloads in prop::collection::vec(
                (prop::collection::vec(any::<u8>(), 1..512), any::<bool>()),
                1..6,
            ),
            prefix in 0usize..64,
        ) {
            let mut fixture = ArchiveFixture::new(vec![0u8; prefix]);
            for (i, (payload, compressed)) in payloads.iter().enumerate() {
                fixture = fixture.with_entry(&format!("entry{i}"), payload.clone(), *compressed);
            }
            let mut reader = ArchiveReader::new(Cursor::new(fixture.build())).unwrap();
            let layout = *reader.layout();

            let total: i64 = reader.entries().iter().map(ArchiveEntryDescriptor::stored_size).sum();
            prop_assert!(layout.data_start + total as u64 <= layout.registry_start);

            let entries = reader.entries().to_vec();
            for (entry, (payload, _)) in entries.iter().zip(&payloads) {
                let extracted = reader.read_entry(entry).unwrap();
                prop_assert_eq!(&extracted, payload);
            }
        }
    }
}
