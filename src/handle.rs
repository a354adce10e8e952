//! Random-access handle over a fully materialized entry.
//!
//! Reads copy out of an immutable buffer. The cursor is never validated at
//! seek time: a cursor past the end just makes the next read return zero
//! bytes.

use std::time::SystemTime;

use crate::vfs::{FileHandle, FileType};
use crate::{Error, Result};

/// Where a [`ResolvedFileHandle`] gets its metadata from.
pub enum MetadataSource {
    /// Copied from the container handle when the entry was opened.
    Snapshot {
        /// Last-modified time, if the container's filesystem reported one.
        modified: Option<SystemTime>,
        /// The container's file type.
        file_type: FileType,
        /// Whether the container lives on local disk.
        on_disk: bool,
    },
    /// Asked live of the still-open compressed source on each query.
    Forwarded(Box<dyn FileHandle>),
}

impl MetadataSource {
    /// Captures the metadata of `handle` now.
    ///
    /// A source that does not support last-modified queries is recorded as
    /// having no timestamp; any other error propagates.
    pub fn snapshot(handle: &dyn FileHandle) -> Result<Self> {
        let modified = match handle.last_modified() {
            Ok(time) => Some(time),
            Err(Error::Unsupported(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(MetadataSource::Snapshot {
            modified,
            file_type: handle.file_type(),
            on_disk: handle.on_disk(),
        })
    }
}

impl std::fmt::Debug for MetadataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataSource::Snapshot {
                modified,
                file_type,
                on_disk,
            } => f
                .debug_struct("Snapshot")
                .field("modified", modified)
                .field("file_type", file_type)
                .field("on_disk", on_disk)
                .finish(),
            MetadataSource::Forwarded(inner) => {
                f.debug_tuple("Forwarded").field(&inner.path()).finish()
            }
        }
    }
}

/// A seekable handle serving reads from an in-memory buffer.
#[derive(Debug)]
pub struct ResolvedFileHandle {
    path: String,
    data: Box<[u8]>,
    cursor: u64,
    metadata: MetadataSource,
}

impl ResolvedFileHandle {
    /// Creates a handle over `data`, with the cursor at 0.
    pub fn new(path: impl Into<String>, data: Box<[u8]>, metadata: MetadataSource) -> Self {
        Self {
            path: path.into(),
            data,
            cursor: 0,
            metadata,
        }
    }

    /// Returns the materialized bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn copy_at(&self, buf: &mut [u8], offset: u64) -> usize {
        let len = self.data.len() as u64;
        if offset >= len {
            return 0;
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        n
    }
}

impl FileHandle for ResolvedFileHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.copy_at(buf, self.cursor);
        self.cursor += n as u64;
        Ok(n)
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        Ok(self.copy_at(buf, offset))
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        self.cursor = position;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.cursor
    }

    fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn can_seek(&self) -> bool {
        true
    }

    fn last_modified(&self) -> Result<SystemTime> {
        match &self.metadata {
            MetadataSource::Snapshot { modified, .. } => modified.ok_or_else(|| {
                Error::Unsupported(
                    "last-modified time not reported by the underlying filesystem".into(),
                )
            }),
            MetadataSource::Forwarded(inner) => inner.last_modified(),
        }
    }

    fn file_type(&self) -> FileType {
        match &self.metadata {
            MetadataSource::Snapshot { file_type, .. } => *file_type,
            MetadataSource::Forwarded(inner) => inner.file_type(),
        }
    }

    fn on_disk(&self) -> bool {
        match &self.metadata {
            MetadataSource::Snapshot { on_disk, .. } => *on_disk,
            MetadataSource::Forwarded(inner) => inner.on_disk(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchiveConfig;
    use crate::vfs::{Context, FileSystem, MemoryFile, MemoryFileSystem, OpenFlags};
    use std::time::Duration;

    fn snapshot(modified: Option<SystemTime>) -> MetadataSource {
        MetadataSource::Snapshot {
            modified,
            file_type: FileType::Regular,
            on_disk: true,
        }
    }

    fn handle(data: &[u8]) -> ResolvedFileHandle {
        ResolvedFileHandle::new("h", data.to_vec().into_boxed_slice(), snapshot(None))
    }

    #[test]
    fn test_read_advances_cursor() {
        let mut h = handle(b"hello world");
        let mut buf = [0u8; 5];
        assert_eq!(h.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(h.position(), 5);
        assert_eq!(h.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b" worl");
        assert_eq!(h.read(&mut buf).unwrap(), 1);
        assert_eq!(h.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_at_keeps_cursor() {
        let mut h = handle(b"hello world");
        let mut buf = [0u8; 5];
        assert_eq!(h.read_at(&mut buf, 6).unwrap(), 5);
        assert_eq!(&buf, b"world");
        assert_eq!(h.position(), 0);
        assert_eq!(h.read_at(&mut buf, 100).unwrap(), 0);
    }

    #[test]
    fn test_seek_past_end_reads_nothing() {
        let mut h = handle(b"abc");
        h.seek(3).unwrap();
        assert_eq!(h.read(&mut [0u8; 1]).unwrap(), 0);
        h.seek(1000).unwrap();
        assert_eq!(h.position(), 1000);
        assert_eq!(h.read(&mut [0u8; 1]).unwrap(), 0);
        h.reset().unwrap();
        assert_eq!(h.position(), 0);
        assert_eq!(h.size().unwrap(), 3);
    }

    #[test]
    fn test_snapshot_metadata() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        let h = ResolvedFileHandle::new("h", Vec::new().into_boxed_slice(), snapshot(Some(time)));
        assert_eq!(h.last_modified().unwrap(), time);
        assert_eq!(h.file_type(), FileType::Regular);
        assert!(h.on_disk());

        let h = handle(b"");
        assert!(h.last_modified().unwrap_err().is_unsupported());
    }

    #[test]
    fn test_forwarded_metadata() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(7);
        let fs = MemoryFileSystem::new().with_file("src.xz", MemoryFile::new(b"x").modified(time));
        let config = ArchiveConfig::default();
        let ctx = Context::new(&fs, &config);
        let inner = fs.open_file("src.xz", OpenFlags::READ, &ctx).unwrap();

        let snap = MetadataSource::snapshot(inner.as_ref()).unwrap();
        assert!(matches!(snap, MetadataSource::Snapshot { on_disk: false, .. }));

        let h = ResolvedFileHandle::new(
            "xz://src.xz",
            Box::new(*b"decoded"),
            MetadataSource::Forwarded(inner),
        );
        assert_eq!(h.last_modified().unwrap(), time);
        assert!(!h.on_disk());
        assert_eq!(h.size().unwrap(), 7);
    }
}
