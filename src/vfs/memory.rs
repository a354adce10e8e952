//! In-process filesystem holding files as byte buffers.
//!
//! Stands in for remote or object-store backends in tests and embedders:
//! files can be marked non-seekable and reads can be capped to emulate
//! sources that return short reads.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use super::{Context, FileHandle, FileSystem, FileType, OpenFlags};
use crate::{Error, Result};

/// A file stored in a [`MemoryFileSystem`].
///
/// # Example
///
/// ```rust
/// use std::time::SystemTime;
/// use zipvfs::vfs::MemoryFile;
///
/// let file = MemoryFile::new(b"hello".to_vec())
///     .modified(SystemTime::UNIX_EPOCH)
///     .max_read(2);
/// assert_eq!(file.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFile {
    data: Arc<[u8]>,
    modified: Option<SystemTime>,
    seekable: bool,
    max_read: Option<usize>,
}

impl MemoryFile {
    /// Creates a seekable file with no modification time.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into().into(),
            modified: None,
            seekable: true,
            max_read: None,
        }
    }

    /// Sets the modification time.
    pub fn modified(mut self, time: SystemTime) -> Self {
        self.modified = Some(time);
        self
    }

    /// Marks the file as seekable or not.
    pub fn seekable(mut self, seekable: bool) -> Self {
        self.seekable = seekable;
        self
    }

    /// Caps the number of bytes a single `read` call returns.
    pub fn max_read(mut self, max: usize) -> Self {
        self.max_read = Some(max.max(1));
        self
    }

    /// Returns the file length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Filesystem over an in-memory map of paths to files.
///
/// Claims every path; use it as the base filesystem of a
/// [`VirtualFileSystem`](super::VirtualFileSystem).
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<BTreeMap<String, MemoryFile>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn insert(&self, path: impl Into<String>, file: MemoryFile) {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(path.into(), file);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_file(self, path: impl Into<String>, file: MemoryFile) -> Self {
        self.insert(path, file);
        self
    }

    fn get(&self, path: &str) -> Option<MemoryFile> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.get(path).cloned()
    }
}

impl FileSystem for MemoryFileSystem {
    fn name(&self) -> &str {
        "MemoryFileSystem"
    }

    fn can_handle_file(&self, _path: &str) -> bool {
        true
    }

    fn open_file(
        &self,
        path: &str,
        flags: OpenFlags,
        _ctx: &Context<'_>,
    ) -> Result<Box<dyn FileHandle>> {
        flags.require_read_only(self.name())?;
        let file = self.get(path).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file: {}", path),
            ))
        })?;
        Ok(Box::new(MemoryHandle {
            path: path.to_string(),
            file,
            position: 0,
        }))
    }

    fn file_exists(&self, path: &str, _ctx: &Context<'_>) -> Result<bool> {
        Ok(self.get(path).is_some())
    }

    fn glob(&self, pattern: &str, _ctx: &Context<'_>) -> Result<Vec<String>> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| Error::InvalidGlob(e.to_string()))?;
        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..Default::default()
        };
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        Ok(files
            .keys()
            .filter(|path| pattern.matches_with(path, options))
            .cloned()
            .collect())
    }
}

#[derive(Debug)]
struct MemoryHandle {
    path: String,
    file: MemoryFile,
    position: u64,
}

impl MemoryHandle {
    fn copy_from(&self, buf: &mut [u8], offset: u64) -> usize {
        let data = &self.file.data;
        let Ok(start) = usize::try_from(offset) else {
            return 0;
        };
        if start >= data.len() {
            return 0;
        }
        let cap = self.file.max_read.unwrap_or(usize::MAX);
        let n = buf.len().min(data.len() - start).min(cap);
        buf[..n].copy_from_slice(&data[start..start + n]);
        n
    }
}

impl FileHandle for MemoryHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.copy_from(buf, self.position);
        self.position += n as u64;
        Ok(n)
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        Ok(self.copy_from(buf, offset))
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        // Rewinding is always allowed so non-seekable sources can be re-read.
        if !self.file.seekable && position != 0 {
            return Err(Error::NotSeekable {
                path: self.path.clone(),
            });
        }
        self.position = position;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn size(&self) -> Result<u64> {
        Ok(self.file.data.len() as u64)
    }

    fn can_seek(&self) -> bool {
        self.file.seekable
    }

    fn last_modified(&self) -> Result<SystemTime> {
        self.file
            .modified
            .ok_or_else(|| Error::Unsupported("memory file has no modification time".into()))
    }

    fn file_type(&self) -> FileType {
        FileType::Regular
    }

    fn on_disk(&self) -> bool {
        false
    }
}
