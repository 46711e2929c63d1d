//! End-to-end segment extraction

use super::error::{SegmentError, SegmentResult};
use super::{Segment, SegmentKind};
use crate::archive::ArchiveReader;
use crate::codec::CodecError;
use crate::config::ExtractConfig;
use crate::header::{FileHeaderRecord, HEADER_SPAN, decode_header};
use crate::storage::{self, ScopedStorage};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Marker expected inside the game data entry
pub const GAME_FILE_MAGIC: [u8; 4] = *b"DMLI";

/// Offset of [`GAME_FILE_MAGIC`], just past the game data entry's header
pub const GAME_FILE_MAGIC_OFFSET: u64 = 556;

/// Splits game data files into classified segments
#[derive(Debug, Clone, Default)]
pub struct SegmentExtractor {
    config: ExtractConfig,
}

impl SegmentExtractor {
    /// Create an extractor with the given settings
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Settings in effect
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract every segment of the file at `path`
    ///
    /// Segments come back in file order: header, thumbnail when present,
    /// then archive entries in registry order. On failure nothing created by
    /// this call is left on disk.
    pub fn extract(&self, path: impl AsRef<Path>) -> SegmentResult<Vec<Segment>> {
        let path = path.as_ref();
        self.config.validate()?;
        info!("Extracting segments from {}", path.display());

        let mut segments = Vec::new();
        match self.extract_into(path, &mut segments) {
            Ok(()) => {
                info!("Extracted {} segments", segments.len());
                Ok(segments)
            }
            Err(e) => {
                debug!(
                    "Extraction failed, discarding {} segments: {e}",
                    segments.len()
                );
                for segment in segments {
                    let path = segment.path().to_path_buf();
                    if let Err(err) = segment.discard() {
                        warn!("Failed to remove {}: {err}", path.display());
                    }
                }
                Err(e)
            }
        }
    }

    fn extract_into(&self, path: &Path, segments: &mut Vec<Segment>) -> SegmentResult<()> {
        let file = File::open(path)?;
        let mut input = BufReader::with_capacity(self.config.block_size, file);

        let header = decode_header(&mut input)?;
        info!(
            "Header: game={:?} save={:?} level={:?} guid={} thumbnail={} bytes",
            header.game_name,
            header.save_name,
            header.level_name,
            header.game_guid,
            header.thumbnail_size
        );

        segments.push(self.header_segment(&mut input, &header)?);
        if header.has_thumbnail() {
            segments.push(self.thumbnail_segment(&mut input, &header)?);
        }
        drop(input);

        let mut archive = ArchiveReader::open_with_config(path, self.config.clone())?;
        for entry in archive.entries().to_vec() {
            let kind = SegmentKind::from_entry_name(entry.base_name());
            let mut storage = archive.extract(&entry)?;

            if kind == SegmentKind::GameDataFile
                && let Err(e) = check_game_file(storage.file_mut())
            {
                let path = storage.path().to_path_buf();
                if let Err(err) = storage.remove() {
                    warn!("Failed to remove {}: {err}", path.display());
                }
                return Err(e);
            }

            debug!(
                "Segment {kind} from entry {} at {}",
                entry.name,
                storage.path().display()
            );
            segments.push(Segment::detached(kind, storage));
        }
        Ok(())
    }

    fn header_segment(
        &self,
        input: &mut BufReader<File>,
        header: &FileHeaderRecord,
    ) -> SegmentResult<Segment> {
        let size = u64::try_from(header.header_size)
            .ok()
            .filter(|&size| size >= HEADER_SPAN as u64)
            .ok_or_else(|| {
                SegmentError::FormatInconsistency(format!(
                    "header size {} is shorter than the {HEADER_SPAN}-byte header span",
                    header.header_size
                ))
            })?;
        input.seek(SeekFrom::Start(0))?;
        self.copy_region(input, SegmentKind::HeaderRecord, 0, size)
    }

    fn thumbnail_segment(
        &self,
        input: &mut BufReader<File>,
        header: &FileHeaderRecord,
    ) -> SegmentResult<Segment> {
        let offset = u64::try_from(header.thumbnail_offset).map_err(|_| {
            SegmentError::FormatInconsistency(format!(
                "negative thumbnail offset {}",
                header.thumbnail_offset
            ))
        })?;
        input.seek(SeekFrom::Start(offset))?;
        self.copy_region(
            input,
            SegmentKind::ThumbnailImage,
            offset,
            header.thumbnail_size as u64,
        )
    }

    /// Copy `count` bytes from the current position into a scoped segment
    fn copy_region<R: Read>(
        &self,
        input: &mut R,
        kind: SegmentKind,
        offset: u64,
        count: u64,
    ) -> SegmentResult<Segment> {
        let mut temp = storage::new_temp_file(&self.config)?;
        let copied = {
            let mut sink = BufWriter::with_capacity(self.config.block_size, temp.as_file_mut());
            let copied = storage::copy_exact(input, &mut sink, count, self.config.block_size)?;
            sink.flush()?;
            copied
        };
        if copied < count {
            return Err(CodecError::TruncatedInput {
                offset,
                needed: count,
                remaining: copied,
            }
            .into());
        }

        let storage = ScopedStorage::from_temp(temp)?;
        debug!(
            "Segment {kind}: {count} bytes at {offset} to {}",
            storage.path().display()
        );
        Ok(Segment::scoped(kind, storage))
    }
}

/// Extract every segment of the file at `path` with default settings
pub fn extract_segments(path: impl AsRef<Path>) -> SegmentResult<Vec<Segment>> {
    SegmentExtractor::default().extract(path)
}

/// Verify the game data marker, leaving the stream rewound
fn check_game_file<R: Read + Seek>(entry: &mut R) -> SegmentResult<()> {
    entry.seek(SeekFrom::Start(GAME_FILE_MAGIC_OFFSET))?;
    let mut found = Vec::with_capacity(GAME_FILE_MAGIC.len());
    entry
        .by_ref()
        .take(GAME_FILE_MAGIC.len() as u64)
        .read_to_end(&mut found)?;
    entry.seek(SeekFrom::Start(0))?;

    if found != GAME_FILE_MAGIC {
        return Err(SegmentError::InvalidGameFile {
            found: String::from_utf8_lossy(&found).into_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use xgfile_test_utils::{GameFileFixture, game_payload};

    #[test]
    fn test_marker_accepted() {
        let mut entry = Cursor::new(game_payload(700));
        check_game_file(&mut entry).unwrap();
        assert_eq!(entry.position(), 0);
    }

    #[test]
    fn test_marker_mismatch() {
        let mut data = game_payload(700);
        data[556..560].copy_from_slice(b"XXXX");
        let err = check_game_file(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidGameFile { ref found } if found == "XXXX"));
    }

    #[test]
    fn test_entry_too_short_for_marker() {
        let err = check_game_file(&mut Cursor::new(vec![0u8; 558])).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidGameFile { .. }));
    }

    #[test]
    fn test_segment_order_with_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let input = GameFileFixture::new()
            .with_thumbnail(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3])
            .with_entry("temp.xgi", vec![1; 64])
            .with_entry("temp.xg", game_payload(1024))
            .with_entry("temp.xgr", vec![2; 32])
            .with_entry("temp.xgc", vec![3; 16])
            .with_entry("extra.bin", vec![4; 8])
            .write_to(dir.path());

        let scratch = tempfile::tempdir().unwrap();
        let extractor =
            SegmentExtractor::new(ExtractConfig::default().with_temp_dir(scratch.path()));
        let segments = extractor.extract(&input).unwrap();

        let kinds: Vec<_> = segments.iter().map(Segment::kind).collect();
        assert_eq!(
            kinds,
            [
                SegmentKind::HeaderRecord,
                SegmentKind::ThumbnailImage,
                SegmentKind::GameHeaderFile,
                SegmentKind::GameDataFile,
                SegmentKind::RolloutsFile,
                SegmentKind::CommentsFile,
                SegmentKind::Unknown,
            ]
        );
        assert!(segments[0].is_auto_delete());
        assert!(segments[1].is_auto_delete());
        assert!(segments[2..].iter().all(|s| !s.is_auto_delete()));

        for segment in segments {
            segment.discard().unwrap();
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_header_size_shorter_than_span() {
        for size in [0, 100, HEADER_SPAN as i32 - 1] {
            let dir = tempfile::tempdir().unwrap();
            let scratch = tempfile::tempdir().unwrap();
            let input = GameFileFixture::new()
                .with_header_size(size)
                .with_entry("temp.xg", game_payload(600))
                .write_to(dir.path());

            let extractor =
                SegmentExtractor::new(ExtractConfig::default().with_temp_dir(scratch.path()));
            let err = extractor.extract(&input).unwrap_err();
            assert!(matches!(err, SegmentError::FormatInconsistency(_)), "size {size}");
            assert!(err.is_format_error());
            assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
        }
    }

    #[test]
    fn test_header_segment_matches_span() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let fixture = GameFileFixture::new().with_entry("temp.xg", game_payload(600));
        let input = fixture.write_to(dir.path());

        let extractor =
            SegmentExtractor::new(ExtractConfig::default().with_temp_dir(scratch.path()));
        let mut segments = extractor.extract(&input).unwrap();
        assert_eq!(segments[0].read_all().unwrap(), fixture.header_span());
        for segment in segments {
            segment.discard().unwrap();
        }
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let extractor = SegmentExtractor::new(ExtractConfig::default().with_block_size(0));
        assert!(matches!(
            extractor.extract("does-not-matter"),
            Err(SegmentError::Config(_))
        ));
    }
}
