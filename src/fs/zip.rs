//! `zip://` handler: ZIP archives only, split on a fixed `.zip` suffix
//! regardless of session configuration.
//!
//! Entry metadata is forwarded to the container handle, which is kept open
//! for the lifetime of the returned file.

use super::{exists_or_false, open_seekable, strip_scheme};
use crate::archive_path::{RECURSIVE_WILDCARD, Separator, SplitPath, segments, split_archive_path};
use crate::format::ContainerReader;
use crate::glob::{GlobPattern, has_glob, match_entries};
use crate::handle::{MetadataSource, ResolvedFileHandle};
use crate::locate::read_entry_fully;
use crate::vfs::{Context, FileHandle, FileSystem, OpenFlags};
use crate::{Error, Result};

const PREFIX: &str = "zip://";
const NAME: &str = "ZipFileSystem";
const SUFFIX: &str = ".zip";

/// Reads entries of ZIP archives addressed as `zip://<locator>.zip/<entry>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipFileSystem;

impl ZipFileSystem {
    /// Creates the handler.
    pub fn new() -> Self {
        Self
    }

    /// Splits a `zip://` path. A path ending at `.zip` names the container,
    /// reported as an empty inner path.
    fn split(path: &str) -> Result<SplitPath> {
        let rest = strip_scheme(path, PREFIX)
            .ok_or_else(|| Error::malformed_path(path, "missing zip locator"))?;
        let mut split = split_archive_path(rest, &Separator::Suffix(SUFFIX.to_string()))?;
        if split.inner == RECURSIVE_WILDCARD {
            split.inner.clear();
        }
        Ok(split)
    }
}

impl FileSystem for ZipFileSystem {
    fn name(&self) -> &str {
        NAME
    }

    fn can_handle_file(&self, path: &str) -> bool {
        strip_scheme(path, PREFIX).is_some()
    }

    fn open_file(
        &self,
        path: &str,
        flags: OpenFlags,
        ctx: &Context<'_>,
    ) -> Result<Box<dyn FileHandle>> {
        flags.require_read_only(NAME)?;
        let split = Self::split(path)?;
        if split.inner.is_empty() {
            return ctx.open_read(&split.locator);
        }

        let container = open_seekable(&split.locator, ctx)?;
        let mut reader = ContainerReader::open_zip(container)?;
        let data = reader
            .find_named(&split.inner, read_entry_fully)?
            .ok_or_else(|| Error::entry_not_found(&split.locator, &split.inner))?;

        let metadata = match reader.into_handle() {
            Some(handle) => MetadataSource::Forwarded(handle),
            None => {
                return Err(Error::container_init(
                    "zip",
                    format!("'{}' released its container handle", split.locator),
                ));
            }
        };
        log::debug!("{}: '{}' resolved to {} bytes", NAME, path, data.len());
        Ok(Box::new(ResolvedFileHandle::new(path, data, metadata)))
    }

    fn file_exists(&self, path: &str, ctx: &Context<'_>) -> Result<bool> {
        let split = Self::split(path)?;
        let lookup = open_seekable(&split.locator, ctx).and_then(|container| {
            let mut reader = ContainerReader::open_zip(container)?;
            if split.inner.is_empty() {
                return Ok(true);
            }
            Ok(reader.find_named(&split.inner, |_, _| Ok(()))?.is_some())
        });
        exists_or_false(path, lookup)
    }

    fn glob(&self, pattern: &str, ctx: &Context<'_>) -> Result<Vec<String>> {
        let split = Self::split(pattern)?;
        if has_glob(&split.locator) {
            return Err(Error::InvalidGlob(format!(
                "cannot glob multiple zip files: '{}'",
                pattern
            )));
        }
        if !has_glob(&split.inner) {
            return Ok(vec![pattern.to_string()]);
        }
        if segments(&split.inner).any(|s| s == "zip:" || s.ends_with(SUFFIX)) {
            return Err(Error::InvalidGlob(format!(
                "globbing into nested zip files is not supported: '{}'",
                pattern
            )));
        }

        let glob = GlobPattern::parse(&split.inner)?;
        let container = open_seekable(&split.locator, ctx)?;
        let mut reader = ContainerReader::open_zip(container)?;
        let prefix = format!("{}{}/", PREFIX, split.locator);
        match_entries(&mut reader, &glob, &prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{MemoryFile, MemoryFileSystem, VirtualFileSystem};
    use std::io::Write;
    use std::time::{Duration, SystemTime};

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn vfs() -> VirtualFileSystem {
        let base = MemoryFileSystem::new()
            .with_file(
                "a.zip",
                MemoryFile::new(zip_bytes(&[
                    ("x/1.txt", b"first"),
                    ("x/2.txt", b"second"),
                    ("inner.zip", b"PK"),
                ])),
            )
            .with_file("b.zip", MemoryFile::new(zip_bytes(&[("x/1.txt", b"b")])))
            .with_file("junk.zip", MemoryFile::new(b"not a zip".to_vec()));
        VirtualFileSystem::with_base(Box::new(base))
    }

    #[test]
    fn test_split_container_only() {
        assert_eq!(ZipFileSystem::split("zip://a.zip").unwrap().inner, "");
        assert_eq!(ZipFileSystem::split("zip://a.zip/").unwrap().inner, "");
        assert_eq!(ZipFileSystem::split("zip://a.zip/x").unwrap().inner, "x");
    }

    #[test]
    fn test_split_ignores_session_token() {
        let vfs = vfs();
        vfs.set_config(crate::ArchiveConfig::new().split("!"));
        assert!(vfs.file_exists("zip://a.zip/x/1.txt").unwrap());
    }

    #[test]
    fn test_open_entry_forwards_metadata() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        let base = MemoryFileSystem::new().with_file(
            "m.zip",
            MemoryFile::new(zip_bytes(&[("f", b"data")])).modified(modified),
        );
        let vfs = VirtualFileSystem::with_base(Box::new(base));
        let mut handle = vfs.open_file("zip://m.zip/f", OpenFlags::READ).unwrap();
        let mut buf = [0u8; 8];
        let n = handle.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"data");
        assert_eq!(handle.last_modified().unwrap(), modified);
    }

    #[test]
    fn test_open_container() {
        let handle = vfs().open_file("zip://a.zip", OpenFlags::READ).unwrap();
        assert_eq!(handle.path(), "a.zip");
    }

    #[test]
    fn test_open_errors() {
        let vfs = vfs();
        let err = vfs.open_file("zip://a.zip/missing", OpenFlags::READ).unwrap_err();
        assert!(err.is_not_found());
        let err = vfs.open_file("zip://junk.zip/x", OpenFlags::READ).unwrap_err();
        assert!(matches!(err, Error::ContainerInit { .. }));
        let err = vfs.open_file("zip://a.tar/x", OpenFlags::READ).unwrap_err();
        assert!(matches!(err, Error::MalformedPath { .. }));
    }

    #[test]
    fn test_exists() {
        let vfs = vfs();
        assert!(vfs.file_exists("zip://a.zip/x/2.txt").unwrap());
        assert!(vfs.file_exists("zip://a.zip").unwrap());
        assert!(!vfs.file_exists("zip://a.zip/x/3.txt").unwrap());
        assert!(!vfs.file_exists("zip://junk.zip/x").unwrap());
        assert!(!vfs.file_exists("zip://nope.zip/x").unwrap());
    }

    #[test]
    fn test_glob() {
        let result = vfs().glob("zip://a.zip/x/*.txt").unwrap();
        assert_eq!(result, vec!["zip://a.zip/x/1.txt", "zip://a.zip/x/2.txt"]);
    }

    #[test]
    fn test_glob_without_wildcard_is_unchanged() {
        let result = vfs().glob("zip://junk.zip/x/1.txt").unwrap();
        assert_eq!(result, vec!["zip://junk.zip/x/1.txt"]);
    }

    #[test]
    fn test_glob_rejections() {
        let vfs = vfs();
        let err = vfs.glob("zip://*.zip/x/*").unwrap_err();
        assert!(err.to_string().contains("cannot glob multiple zip files"));
        let err = vfs.glob("zip://a.zip/inner.zip/*").unwrap_err();
        assert!(matches!(err, Error::InvalidGlob(_)));
        let err = vfs.glob("zip://a.zip/zip:/*").unwrap_err();
        assert!(matches!(err, Error::InvalidGlob(_)));
    }

    #[test]
    fn test_glob_open_failures_are_hard_errors() {
        let vfs = vfs();
        assert!(vfs.glob("zip://junk.zip/*").is_err());
        assert!(vfs.glob("zip://nope.zip/*").is_err());
    }
}
