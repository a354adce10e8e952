//! Local disk filesystem.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::SystemTime;

use super::{Context, FileHandle, FileSystem, FileType, OpenFlags};
use crate::{Error, Result};

/// Filesystem backed by `std::fs`.
///
/// Claims every path, so it is normally used as the base filesystem of a
/// [`VirtualFileSystem`](super::VirtualFileSystem) rather than registered as
/// a handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Creates a local filesystem.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn name(&self) -> &str {
        "LocalFileSystem"
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
        let file = std::fs::OpenOptions::new()
            .read(flags.read)
            .write(flags.write)
            .open(path)?;
        let metadata = file.metadata()?;
        Ok(Box::new(LocalFileHandle {
            path: path.to_string(),
            file,
            position: 0,
            size: metadata.len(),
            modified: metadata.modified().ok(),
            file_type: file_type_of(&metadata.file_type()),
        }))
    }

    fn file_exists(&self, path: &str, _ctx: &Context<'_>) -> Result<bool> {
        Ok(Path::new(path).is_file())
    }

    fn glob(&self, pattern: &str, _ctx: &Context<'_>) -> Result<Vec<String>> {
        let paths = glob::glob(pattern).map_err(|e| Error::InvalidGlob(e.to_string()))?;
        let mut result = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => result.push(path.to_string_lossy().into_owned()),
                Err(e) => log::warn!("Skipping unreadable path during glob: {}", e),
            }
        }
        result.sort();
        Ok(result)
    }

    fn path_separator(&self) -> &str {
        std::path::MAIN_SEPARATOR_STR
    }
}

fn file_type_of(ft: &std::fs::FileType) -> FileType {
    if ft.is_file() {
        return FileType::Regular;
    }
    if ft.is_dir() {
        return FileType::Directory;
    }
    if ft.is_symlink() {
        return FileType::Symlink;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if ft.is_char_device() {
            return FileType::CharDevice;
        }
        if ft.is_block_device() {
            return FileType::BlockDevice;
        }
        if ft.is_fifo() {
            return FileType::Fifo;
        }
        if ft.is_socket() {
            return FileType::Socket;
        }
    }
    FileType::Invalid
}

/// Handle to a file on local disk.
#[derive(Debug)]
struct LocalFileHandle {
    path: String,
    file: File,
    position: u64,
    size: u64,
    modified: Option<SystemTime>,
    file_type: FileType,
}

impl FileHandle for LocalFileHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.file.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.file.seek(SeekFrom::Start(self.position))?;
        Ok(filled)
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(position))?;
        self.position = position;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }

    fn can_seek(&self) -> bool {
        self.file_type == FileType::Regular
    }

    fn last_modified(&self) -> Result<SystemTime> {
        self.modified.ok_or_else(|| {
            Error::Unsupported("last-modified time not available on this platform".into())
        })
    }

    fn file_type(&self) -> FileType {
        self.file_type
    }

    fn on_disk(&self) -> bool {
        true
    }
}
