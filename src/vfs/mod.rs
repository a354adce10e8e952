//! Filesystem and file handle abstractions.
//!
//! Every layer in this crate speaks the same two traits: [`FileSystem`]
//! resolves paths to handles, and [`FileHandle`] is an open, sized,
//! optionally seekable byte source. Container handlers consume handles from
//! an underlying filesystem (local disk, memory, or anything a caller plugs
//! in) and produce handles of their own, so containers stored behind network
//! or object-store layers work the same as local ones.
//!
//! Filesystem calls receive a [`Context`] carrying the dispatching
//! filesystem and the session [`ArchiveConfig`], which is how a handler
//! opens the container named by a composite path without holding a
//! reference to its parent.

mod local;
mod memory;
mod virtual_fs;

pub use local::LocalFileSystem;
pub use memory::{MemoryFile, MemoryFileSystem};
pub use virtual_fs::VirtualFileSystem;

use std::time::SystemTime;

use crate::{ArchiveConfig, Error, Result};

/// Access mode requested when opening a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
}

impl OpenFlags {
    /// Read-only access.
    pub const READ: OpenFlags = OpenFlags {
        read: true,
        write: false,
    };

    /// Read-write access.
    pub const READ_WRITE: OpenFlags = OpenFlags {
        read: true,
        write: true,
    };

    /// Returns an error unless these flags request read-only access.
    pub fn require_read_only(&self, filesystem: &str) -> Result<()> {
        if !self.read || self.write {
            return Err(Error::Unsupported(format!(
                "{} can only open for reading",
                filesystem
            )));
        }
        Ok(())
    }
}

/// Classification of a file as reported by its filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// A regular file.
    Regular,
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
    /// A character device.
    CharDevice,
    /// A block device.
    BlockDevice,
    /// A named pipe.
    Fifo,
    /// A socket.
    Socket,
    /// Unknown or not reported.
    Invalid,
}

/// An open file.
///
/// Implementations keep a cursor that `read` advances and `seek`/`reset`
/// move. `read_at` never touches the cursor.
pub trait FileHandle: Send {
    /// Returns the path this handle was opened with.
    fn path(&self) -> &str;

    /// Reads up to `buf.len()` bytes at the cursor and advances it.
    ///
    /// Returns `0` at end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Reads up to `buf.len()` bytes starting at `offset` without moving
    /// the cursor.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize>;

    /// Moves the cursor to an absolute position.
    fn seek(&mut self, position: u64) -> Result<()>;

    /// Returns the cursor position.
    fn position(&self) -> u64;

    /// Moves the cursor back to the start.
    fn reset(&mut self) -> Result<()> {
        self.seek(0)
    }

    /// Returns the total size in bytes.
    fn size(&self) -> Result<u64>;

    /// Returns true if `seek` supports arbitrary positions.
    fn can_seek(&self) -> bool;

    /// Returns the last-modified time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] when the source does not record one.
    fn last_modified(&self) -> Result<SystemTime>;

    /// Returns the file classification.
    fn file_type(&self) -> FileType;

    /// Returns true if the bytes live on a local disk.
    fn on_disk(&self) -> bool;
}

impl std::fmt::Debug for dyn FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle").field("path", &self.path()).finish()
    }
}

/// A source of file handles addressed by path.
pub trait FileSystem: Send + Sync {
    /// Returns a short name for diagnostics.
    fn name(&self) -> &str;

    /// Returns true if this filesystem claims the given path.
    fn can_handle_file(&self, path: &str) -> bool;

    /// Opens a file.
    fn open_file(
        &self,
        path: &str,
        flags: OpenFlags,
        ctx: &Context<'_>,
    ) -> Result<Box<dyn FileHandle>>;

    /// Returns true if the file exists.
    ///
    /// Only malformed paths are reported as errors; anything that prevents
    /// the file from being found is `Ok(false)`.
    fn file_exists(&self, path: &str, ctx: &Context<'_>) -> Result<bool>;

    /// Expands a pattern into the matching paths.
    fn glob(&self, pattern: &str, ctx: &Context<'_>) -> Result<Vec<String>>;

    /// Returns the separator this filesystem uses between path components.
    fn path_separator(&self) -> &str {
        "/"
    }
}

/// Per-call session state handed to every filesystem operation.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// The filesystem used to resolve container locators.
    pub fs: &'a dyn FileSystem,
    /// Split configuration in effect for this call.
    pub config: &'a ArchiveConfig,
}

impl<'a> Context<'a> {
    /// Creates a context.
    pub fn new(fs: &'a dyn FileSystem, config: &'a ArchiveConfig) -> Self {
        Self { fs, config }
    }

    /// Opens a locator for reading through the context filesystem.
    pub fn open_read(&self, locator: &str) -> Result<Box<dyn FileHandle>> {
        self.fs.open_file(locator, OpenFlags::READ, self)
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("fs", &self.fs.name())
            .field("config", self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_read_only() {
        assert!(OpenFlags::READ.require_read_only("Test").is_ok());

        let err = OpenFlags::READ_WRITE.require_read_only("Test").unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert!(err.to_string().contains("Test can only open for reading"));

        let err = OpenFlags::default().require_read_only("Test").unwrap_err();
        assert!(err.is_unsupported());
    }
}
