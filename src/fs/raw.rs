//! `compressed://` handler: one compressed stream (gzip, bzip2, xz, zstd or
//! none) read as a single file.

use super::{exists_or_false, expand_locator, open_seekable, strip_scheme};
use crate::format::FormatSupport;
use crate::glob::has_glob;
use crate::handle::{MetadataSource, ResolvedFileHandle};
use crate::locate::{entry_exists, extract_raw};
use crate::vfs::{Context, FileHandle, FileSystem, OpenFlags};
use crate::{Error, Result};

const PREFIX: &str = "compressed://";
const NAME: &str = "RawArchiveFileSystem";

/// Decompresses a whole file, addressed as `compressed://<locator>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawArchiveFileSystem;

impl RawArchiveFileSystem {
    /// Creates the handler.
    pub fn new() -> Self {
        Self
    }
}

fn locator(path: &str) -> Result<&str> {
    strip_scheme(path, PREFIX).ok_or_else(|| Error::malformed_path(path, "missing file locator"))
}

impl FileSystem for RawArchiveFileSystem {
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
        let container = open_seekable(locator(path)?, ctx)?;
        let metadata = MetadataSource::snapshot(container.as_ref())?;
        let data = extract_raw(container)?;
        log::debug!("{}: '{}' decompressed to {} bytes", NAME, path, data.len());
        Ok(Box::new(ResolvedFileHandle::new(path, data, metadata)))
    }

    fn file_exists(&self, path: &str, ctx: &Context<'_>) -> Result<bool> {
        let locator = locator(path)?;
        if !ctx.fs.file_exists(locator, ctx)? {
            return Ok(false);
        }
        let lookup = open_seekable(locator, ctx)
            .and_then(|container| entry_exists(container, "", FormatSupport::Raw));
        exists_or_false(path, lookup)
    }

    fn glob(&self, pattern: &str, ctx: &Context<'_>) -> Result<Vec<String>> {
        let locator = locator(pattern)?;
        if !has_glob(locator) {
            return Ok(vec![pattern.to_string()]);
        }
        Ok(expand_locator(locator, ctx)?
            .into_iter()
            .map(|path| format!("{}{}", PREFIX, path))
            .collect())
    }
}
