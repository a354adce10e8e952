//! `bz2://` / `bzip2://` and `xz://` / `lzma://` handlers.
//!
//! The whole compressed file is decoded through
//! [`decode_all`](crate::pipeline::decode_all), concatenated streams
//! included. The source handle stays open so metadata queries reach it.

use super::{expand_locator, strip_scheme};
use crate::codec::StreamCodec;
use crate::glob::has_glob;
use crate::handle::{MetadataSource, ResolvedFileHandle};
use crate::pipeline::{decode_all, read_source_fully};
use crate::vfs::{Context, FileHandle, FileSystem, OpenFlags};
use crate::{Error, Result};

/// Decompresses a single-stream file addressed by one of the codec's
/// schemes, e.g. `xz://backups/db.sql.xz`.
#[derive(Debug, Clone, Copy)]
pub struct StreamFileSystem {
    codec: StreamCodec,
    prefixes: &'static [&'static str],
    name: &'static str,
}

impl StreamFileSystem {
    /// bzip2 files under `bz2://` and `bzip2://`.
    pub fn bzip2() -> Self {
        Self {
            codec: StreamCodec::Bzip2,
            prefixes: &["bz2://", "bzip2://"],
            name: "Bzip2FileSystem",
        }
    }

    /// xz files under `xz://` and `lzma://`.
    pub fn xz() -> Self {
        Self {
            codec: StreamCodec::Xz,
            prefixes: &["xz://", "lzma://"],
            name: "XzFileSystem",
        }
    }

    /// Returns the codec this handler decodes.
    pub fn codec(&self) -> StreamCodec {
        self.codec
    }

    /// Returns the matched scheme prefix and the locator after it.
    fn split<'a>(&self, path: &'a str) -> Option<(&'static str, &'a str)> {
        self.prefixes
            .iter()
            .find_map(|prefix| strip_scheme(path, prefix).map(|rest| (*prefix, rest)))
    }

    fn locator<'a>(&self, path: &'a str) -> Result<(&'static str, &'a str)> {
        self.split(path).ok_or_else(|| {
            Error::malformed_path(path, format!("expected one of {:?}", self.prefixes))
        })
    }
}

impl FileSystem for StreamFileSystem {
    fn name(&self) -> &str {
        self.name
    }

    fn can_handle_file(&self, path: &str) -> bool {
        self.split(path).is_some()
    }

    fn open_file(
        &self,
        path: &str,
        flags: OpenFlags,
        ctx: &Context<'_>,
    ) -> Result<Box<dyn FileHandle>> {
        flags.require_read_only(self.name)?;
        let (_, locator) = self.locator(path)?;
        let mut source = ctx.open_read(locator)?;
        let input = read_source_fully(source.as_mut())?;
        let data = decode_all(self.codec, &input)?;
        log::debug!(
            "{}: '{}' decoded {} -> {} bytes",
            self.name,
            path,
            input.len(),
            data.len()
        );
        Ok(Box::new(ResolvedFileHandle::new(
            path,
            data,
            MetadataSource::Forwarded(source),
        )))
    }

    fn file_exists(&self, path: &str, ctx: &Context<'_>) -> Result<bool> {
        let (_, locator) = self.locator(path)?;
        ctx.fs.file_exists(locator, ctx)
    }

    fn glob(&self, pattern: &str, ctx: &Context<'_>) -> Result<Vec<String>> {
        let (prefix, locator) = self.locator(pattern)?;
        if !has_glob(locator) {
            return Ok(vec![pattern.to_string()]);
        }
        Ok(expand_locator(locator, ctx)?
            .into_iter()
            .map(|path| format!("{}{}", prefix, path))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{MemoryFile, MemoryFileSystem, VirtualFileSystem};
    use std::io::Write;
    use std::time::{Duration, SystemTime};

    fn bz2(data: &[u8]) -> Vec<u8> {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::fast());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn xz(data: &[u8]) -> Vec<u8> {
        let mut encoder = liblzma::write::XzEncoder::new(Vec::new(), 1);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn vfs() -> VirtualFileSystem {
        let mut two = bz2(b"part one, ");
        two.extend(bz2(b"part two"));
        let base = MemoryFileSystem::new()
            .with_file("d/one.bz2", MemoryFile::new(bz2(b"bzip payload")).max_read(5))
            .with_file("d/two.bz2", MemoryFile::new(two))
            .with_file(
                "d/x.xz",
                MemoryFile::new(xz(b"xz payload"))
                    .modified(SystemTime::UNIX_EPOCH + Duration::from_secs(99)),
            )
            .with_file("d/bad.xz", MemoryFile::new(b"definitely not xz".to_vec()));
        VirtualFileSystem::with_base(Box::new(base))
    }

    fn read_all(handle: &mut dyn FileHandle) -> Vec<u8> {
        let mut buf = vec![0u8; handle.size().unwrap() as usize];
        let n = handle.read(&mut buf).unwrap();
        buf.truncate(n);
        buf
    }

    #[test]
    fn test_prefix_aliases() {
        let fs = StreamFileSystem::bzip2();
        assert!(fs.can_handle_file("bz2://a"));
        assert!(fs.can_handle_file("bzip2://a"));
        assert!(!fs.can_handle_file("bz2://"));
        assert!(!fs.can_handle_file("xz://a"));
        let fs = StreamFileSystem::xz();
        assert!(fs.can_handle_file("lzma://a"));
        assert_eq!(fs.codec(), StreamCodec::Xz);
    }

    #[test]
    fn test_open_bzip2_with_short_reads() {
        let mut handle = vfs().open_file("bz2://d/one.bz2", OpenFlags::READ).unwrap();
        assert_eq!(read_all(handle.as_mut()), b"bzip payload");
    }

    #[test]
    fn test_open_concatenated_bzip2() {
        let mut handle = vfs().open_file("bzip2://d/two.bz2", OpenFlags::READ).unwrap();
        assert_eq!(read_all(handle.as_mut()), b"part one, part two");
    }

    #[test]
    fn test_open_xz_forwards_metadata() {
        let mut handle = vfs().open_file("lzma://d/x.xz", OpenFlags::READ).unwrap();
        assert_eq!(read_all(handle.as_mut()), b"xz payload");
        assert_eq!(
            handle.last_modified().unwrap(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(99)
        );
        assert!(!handle.on_disk());
    }

    #[test]
    fn test_open_corrupt() {
        let err = vfs().open_file("xz://d/bad.xz", OpenFlags::READ).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_exists_delegates() {
        let vfs = vfs();
        assert!(vfs.file_exists("xz://d/bad.xz").unwrap());
        assert!(!vfs.file_exists("xz://d/none.xz").unwrap());
    }

    #[test]
    fn test_glob_keeps_scheme() {
        let vfs = vfs();
        assert_eq!(
            vfs.glob("bzip2://d/*.bz2").unwrap(),
            vec!["bzip2://d/one.bz2", "bzip2://d/two.bz2"]
        );
        assert_eq!(vfs.glob("bz2://d/*.bz2").unwrap()[0], "bz2://d/one.bz2");
        assert_eq!(vfs.glob("xz://d/none.xz").unwrap(), vec!["xz://d/none.xz"]);
    }

    #[test]
    fn test_glob_without_matches_fails() {
        let err = vfs().glob("lzma://d/*.lzma").unwrap_err();
        assert!(err.is_not_found());
    }
}
