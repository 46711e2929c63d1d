//! Temporary storage backing extracted segments
//!
//! Two ownership shapes exist and they are distinct types:
//!
//! - [`ScopedStorage`] owns its file and deletes it when released or dropped.
//! - [`DetachedStorage`] hands the file over to the caller: releasing it only
//!   closes the handle, and the caller decides when to [`remove`] it.
//!
//! Both are produced from a temporary file that is fully written and
//! rewound first, so no consumer ever observes a partial write. A write
//! that fails before detaching leaves nothing behind.
//!
//! [`remove`]: DetachedStorage::remove

use crate::config::ExtractConfig;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Create an empty temporary file according to `config`
pub(crate) fn new_temp_file(config: &ExtractConfig) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(&config.temp_prefix);
    match &config.temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
}

/// Copy exactly `count` bytes in `block_size` pieces
///
/// Returns the number of bytes copied, which is short of `count` only when
/// the reader ends first.
pub(crate) fn copy_exact<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    count: u64,
    block_size: usize,
) -> io::Result<u64> {
    let mut buffer = vec![0u8; block_size.max(1)];
    let mut copied = 0u64;
    while copied < count {
        let want = (count - copied).min(buffer.len() as u64) as usize;
        let read = match reader.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..read])?;
        copied += read as u64;
    }
    Ok(copied)
}

fn finish(file: &mut NamedTempFile) -> io::Result<()> {
    file.flush()?;
    file.as_file().sync_data()?;
    file.seek(SeekFrom::Start(0))?;
    Ok(())
}

/// Storage deleted on release
#[derive(Debug)]
pub struct ScopedStorage {
    file: NamedTempFile,
}

impl ScopedStorage {
    /// Take ownership of a fully written temporary file
    pub(crate) fn from_temp(mut file: NamedTempFile) -> io::Result<Self> {
        finish(&mut file)?;
        Ok(Self { file })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Open handle, positioned at the start after creation
    pub fn file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Close the handle and delete the backing file
    pub fn release(self) -> io::Result<()> {
        self.file.close()
    }
}

/// Storage the caller owns once it is returned
#[derive(Debug)]
pub struct DetachedStorage {
    file: File,
    path: PathBuf,
}

impl DetachedStorage {
    /// Detach a fully written temporary file from automatic cleanup
    pub(crate) fn from_temp(mut file: NamedTempFile) -> io::Result<Self> {
        finish(&mut file)?;
        let (file, path) = file.keep()?;
        Ok(Self { file, path })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open handle, positioned at the start after creation
    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Close the handle and leave the backing file in place
    pub fn release(self) -> PathBuf {
        self.path
    }

    /// Close the handle and delete the backing file
    pub fn remove(self) -> io::Result<()> {
        let Self { file, path } = self;
        drop(file);
        fs::remove_file(path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn config_in(dir: &Path) -> ExtractConfig {
        ExtractConfig::default().with_temp_dir(dir)
    }

    #[test]
    fn test_copy_exact_stops_at_count() {
        let mut reader = Cursor::new(vec![7u8; 100]);
        let mut sink = Vec::new();
        assert_eq!(copy_exact(&mut reader, &mut sink, 40, 16).unwrap(), 40);
        assert_eq!(sink.len(), 40);
        assert_eq!(reader.position(), 40);
    }

    #[test]
    fn test_copy_exact_short_reader() {
        let mut reader = Cursor::new(vec![1u8; 10]);
        let mut sink = Vec::new();
        assert_eq!(copy_exact(&mut reader, &mut sink, 40, 3).unwrap(), 10);
    }

    #[test]
    fn test_scoped_release_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp = new_temp_file(&config_in(dir.path())).unwrap();
        temp.write_all(b"scoped").unwrap();

        let mut storage = ScopedStorage::from_temp(temp).unwrap();
        let path = storage.path().to_path_buf();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("tmpXGI"));

        let mut contents = String::new();
        storage.file_mut().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "scoped");

        storage.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_scoped_drop_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ScopedStorage::from_temp(new_temp_file(&config_in(dir.path())).unwrap())
            .unwrap();
        let path = storage.path().to_path_buf();
        drop(storage);
        assert!(!path.exists());
    }

    #[test]
    fn test_detached_survives_release() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp = new_temp_file(&config_in(dir.path())).unwrap();
        temp.write_all(b"detached").unwrap();

        let storage = DetachedStorage::from_temp(temp).unwrap();
        let path = storage.release();
        assert_eq!(fs::read(&path).unwrap(), b"detached");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_detached_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DetachedStorage::from_temp(new_temp_file(&config_in(dir.path())).unwrap())
            .unwrap();
        let path = storage.path().to_path_buf();
        assert!(path.exists());
        storage.remove().unwrap();
        assert!(!path.exists());
    }
}
