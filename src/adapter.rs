//! Adapts an open [`FileHandle`] to the pull model container readers use.
//!
//! Container and decoder libraries pull bytes through `Read`/`Seek` (or the
//! equivalent open/read/seek/close callbacks). [`HandleAdapter`] owns one
//! handle plus a single scratch block and answers those pulls. It never holds
//! more than one block; random access is delegated to the handle's own seek.

use std::io::{self, BufRead, Read, Seek, SeekFrom};

use crate::vfs::FileHandle;
use crate::{Error, Result};

/// Size of the scratch block filled by each `read_block` call.
pub const BLOCK_SIZE: usize = 10 * 1024;

/// Origin for a relative seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// From the start of the source.
    Start,
    /// From the current position.
    Current,
    /// From the end of the source.
    End,
}

impl Whence {
    /// Maps a C-style origin (`0`, `1`, `2`) to a [`Whence`].
    ///
    /// # Errors
    ///
    /// Any other value is rejected with [`Error::Unsupported`].
    pub fn from_raw(origin: i32) -> Result<Self> {
        match origin {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            other => Err(Error::Unsupported(format!(
                "unknown seek origin {}",
                other
            ))),
        }
    }
}

/// Exclusive owner of a seekable handle, driven by a container reader.
pub struct HandleAdapter {
    handle: Box<dyn FileHandle>,
    block: Box<[u8]>,
    filled: usize,
    consumed: usize,
}

impl HandleAdapter {
    /// Wraps a handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSeekable`] if the handle cannot seek; such sources
    /// are rejected up front rather than buffered.
    pub fn new(handle: Box<dyn FileHandle>) -> Result<Self> {
        if !handle.can_seek() {
            return Err(Error::NotSeekable {
                path: handle.path().to_string(),
            });
        }
        Ok(Self {
            handle,
            block: vec![0u8; BLOCK_SIZE].into_boxed_slice(),
            filled: 0,
            consumed: 0,
        })
    }

    /// Callback-protocol open. Always succeeds.
    pub fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Callback-protocol close. Always succeeds.
    pub fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Reads up to [`BLOCK_SIZE`] bytes from the handle into the scratch
    /// block and returns them. An empty slice signals end of data.
    ///
    /// Any bytes still unconsumed from the previous block are discarded.
    pub fn read_block(&mut self) -> Result<&[u8]> {
        let n = self.handle.read(&mut self.block)?;
        self.filled = n;
        self.consumed = 0;
        Ok(&self.block[..n])
    }

    /// Moves the read position and returns the new absolute offset.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.tell(),
            Whence::End => self.handle.size()?,
        };
        let target = base.checked_add_signed(offset).ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            ))
        })?;
        self.handle.seek(target)?;
        self.discard_block();
        Ok(target)
    }

    /// Seek with a C-style numeric origin.
    pub fn seek_raw(&mut self, offset: i64, origin: i32) -> Result<u64> {
        let whence = Whence::from_raw(origin)?;
        self.seek(offset, whence)
    }

    /// Returns the logical read position.
    pub fn tell(&self) -> u64 {
        self.handle.position() - (self.filled - self.consumed) as u64
    }

    /// Returns the wrapped handle.
    pub fn handle(&self) -> &dyn FileHandle {
        self.handle.as_ref()
    }

    /// Releases the wrapped handle.
    pub fn into_inner(self) -> Box<dyn FileHandle> {
        self.handle
    }

    fn discard_block(&mut self) {
        self.filled = 0;
        self.consumed = 0;
    }
}

impl std::fmt::Debug for HandleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleAdapter")
            .field("path", &self.handle.path())
            .field("buffered", &(self.filled - self.consumed))
            .finish()
    }
}

pub(crate) fn into_io(err: Error) -> io::Error {
    match err {
        Error::Io(e) => e,
        other => io::Error::other(other),
    }
}

impl BufRead for HandleAdapter {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.consumed >= self.filled {
            self.read_block().map_err(into_io)?;
        }
        Ok(&self.block[self.consumed..self.filled])
    }

    fn consume(&mut self, amt: usize) {
        self.consumed = (self.consumed + amt).min(self.filled);
    }
}

impl Read for HandleAdapter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Large reads with nothing buffered bypass the scratch block.
        if self.consumed >= self.filled && buf.len() >= BLOCK_SIZE {
            return self.handle.read(buf).map_err(into_io);
        }
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl Seek for HandleAdapter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            SeekFrom::Start(n) => {
                let offset = i64::try_from(n).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset too large")
                })?;
                (offset, Whence::Start)
            }
            SeekFrom::Current(n) => (n, Whence::Current),
            SeekFrom::End(n) => (n, Whence::End),
        };
        HandleAdapter::seek(self, offset, whence).map_err(into_io)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.tell())
    }
}
