//! Container handlers, one per composite-path scheme.
//!
//! | Scheme | Handler | Container |
//! |--------|---------|-----------|
//! | `archive://` | [`ArchiveFileSystem`] | ZIP or TAR, any filter |
//! | `zip://` | [`ZipFileSystem`] | ZIP only |
//! | `compressed://` | [`RawArchiveFileSystem`] | one filtered stream |
//! | `bz2://`, `bzip2://` | [`StreamFileSystem::bzip2`] | concatenated bzip2 streams |
//! | `xz://`, `lzma://` | [`StreamFileSystem::xz`] | concatenated xz streams |
//!
//! Every handler resolves its container locator through the [`Context`]
//! filesystem, so a locator can itself be a URL or another composite path.

mod archive;
mod raw;
mod stream;
mod zip;

pub use archive::ArchiveFileSystem;
pub use raw::RawArchiveFileSystem;
pub use stream::StreamFileSystem;
pub use zip::ZipFileSystem;

use std::io;

use crate::glob::has_glob;
use crate::vfs::{Context, FileHandle};
use crate::{Error, Result};

/// Returns the text after `prefix`, if `path` has it and names something.
pub(crate) fn strip_scheme<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

/// Expands a container locator that contains wildcards through the context
/// filesystem. A literal locator is returned as-is, never globbed, since
/// globbing can mangle URLs.
///
/// A wildcard locator that matches no file is a not-found error.
pub(crate) fn expand_locator(locator: &str, ctx: &Context<'_>) -> Result<Vec<String>> {
    if !has_glob(locator) {
        return Ok(vec![locator.to_string()]);
    }
    let paths = ctx.fs.glob(locator, ctx)?;
    if paths.is_empty() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no files found that match the pattern '{}'", locator),
        )));
    }
    Ok(paths)
}

/// Opens a container locator and checks that it can seek.
pub(crate) fn open_seekable(locator: &str, ctx: &Context<'_>) -> Result<Box<dyn FileHandle>> {
    let handle = ctx.open_read(locator)?;
    if !handle.can_seek() {
        return Err(Error::NotSeekable {
            path: locator.to_string(),
        });
    }
    Ok(handle)
}

/// Maps the outcome of an existence check: malformed paths stay errors,
/// anything else that went wrong means "does not exist".
pub(crate) fn exists_or_false(path: &str, lookup: Result<bool>) -> Result<bool> {
    match lookup {
        Ok(found) => Ok(found),
        Err(e @ Error::MalformedPath { .. }) => Err(e),
        Err(e) => {
            log::debug!("'{}' treated as missing: {}", path, e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchiveConfig;
    use crate::vfs::{MemoryFile, MemoryFileSystem};

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("zip://a.zip", "zip://"), Some("a.zip"));
        assert_eq!(strip_scheme("zip://", "zip://"), None);
        assert_eq!(strip_scheme("xz://a", "zip://"), None);
    }

    #[test]
    fn test_expand_locator() {
        let fs = MemoryFileSystem::new()
            .with_file("d/a.gz", MemoryFile::new(b"a".to_vec()))
            .with_file("d/b.gz", MemoryFile::new(b"b".to_vec()));
        let config = ArchiveConfig::default();
        let ctx = Context::new(&fs, &config);

        assert_eq!(expand_locator("d/*.gz", &ctx).unwrap(), vec!["d/a.gz", "d/b.gz"]);
        assert_eq!(expand_locator("d/none.gz", &ctx).unwrap(), vec!["d/none.gz"]);
        let err = expand_locator("d/*.xz", &ctx).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("no files found"));
    }

    #[test]
    fn test_exists_or_false() {
        assert!(exists_or_false("p", Ok(true)).unwrap());
        assert!(!exists_or_false("p", Err(Error::container_init("zip", "bad"))).unwrap());
        assert!(!exists_or_false("p", Err(Error::entry_not_found("a", "b"))).unwrap());
        assert!(exists_or_false("p", Err(Error::malformed_path("p", "no marker"))).is_err());
    }
}
