//! `archive://` handler: ZIP or TAR containers, any compression filter,
//! with the split policy taken from the session configuration.

use super::{exists_or_false, expand_locator, open_seekable, strip_scheme};
use crate::archive_path::{SplitPath, normalize_inner_path, split_archive_path};
use crate::format::{ContainerReader, FormatSupport};
use crate::glob::{GlobPattern, has_glob, match_entries};
use crate::handle::{MetadataSource, ResolvedFileHandle};
use crate::locate::{entry_exists, locate_and_extract};
use crate::vfs::{Context, FileHandle, FileSystem, OpenFlags};
use crate::{Error, Result};

const PREFIX: &str = "archive://";
const NAME: &str = "ArchiveFileSystem";

/// Reads entries of any supported archive.
///
/// | Path | Meaning |
/// |------|---------|
/// | `archive://data.zip/a/b.csv` | entry `a/b.csv` (default `.zip` suffix) |
/// | `archive://logs.tar.gz!/app.log` | entry `app.log` with split token `!` |
/// | `archive://data.zip/` | the container itself |
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveFileSystem;

impl ArchiveFileSystem {
    /// Creates the handler.
    pub fn new() -> Self {
        Self
    }

    fn split(path: &str, ctx: &Context<'_>) -> Result<SplitPath> {
        let rest = strip_scheme(path, PREFIX)
            .ok_or_else(|| Error::malformed_path(path, "missing archive locator"))?;
        split_archive_path(rest, &ctx.config.separator())
    }
}

impl FileSystem for ArchiveFileSystem {
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
        let split = Self::split(path, ctx)?;

        if split.inner.is_empty() {
            return ctx.open_read(&split.locator);
        }
        if split.is_whole_container() {
            return Err(Error::entry_not_found(&split.locator, &split.inner));
        }

        let inner = normalize_inner_path(&split.inner, ctx.fs.path_separator());
        let container = open_seekable(&split.locator, ctx)?;
        let metadata = MetadataSource::snapshot(container.as_ref())?;
        let data = locate_and_extract(container, &inner)?;
        log::debug!("{}: '{}' resolved to {} bytes", NAME, path, data.len());
        Ok(Box::new(ResolvedFileHandle::new(path, data, metadata)))
    }

    fn file_exists(&self, path: &str, ctx: &Context<'_>) -> Result<bool> {
        let split = Self::split(path, ctx)?;
        if !ctx.fs.file_exists(&split.locator, ctx)? {
            return Ok(false);
        }
        if split.inner.is_empty() {
            return Ok(true);
        }

        let inner = normalize_inner_path(&split.inner, ctx.fs.path_separator());
        let lookup = open_seekable(&split.locator, ctx)
            .and_then(|container| entry_exists(container, &inner, FormatSupport::All));
        exists_or_false(path, lookup)
    }

    fn glob(&self, pattern: &str, ctx: &Context<'_>) -> Result<Vec<String>> {
        let split = Self::split(pattern, ctx)?;
        let containers = expand_locator(&split.locator, ctx)?;
        let infix = ctx.config.result_infix();

        if !has_glob(&split.inner) {
            return Ok(containers
                .into_iter()
                .map(|c| format!("{}{}{}/{}", PREFIX, c, infix, split.inner))
                .collect());
        }

        let inner = normalize_inner_path(&split.inner, ctx.fs.path_separator());
        let glob = GlobPattern::parse(&inner)?;
        let mut result = Vec::new();
        for container in containers {
            // Containers that cannot be opened or cannot seek are skipped;
            // one that opens but fails to initialize fails the glob.
            let handle = match open_seekable(&container, ctx) {
                Ok(handle) => handle,
                Err(e) => {
                    log::warn!("{}: skipping '{}' while globbing: {}", NAME, container, e);
                    continue;
                }
            };
            let mut reader = ContainerReader::open(handle, FormatSupport::All)?;
            let prefix = format!("{}{}{}/", PREFIX, container, infix);
            result.extend(match_entries(&mut reader, &glob, &prefix)?);
        }
        Ok(result)
    }
}
