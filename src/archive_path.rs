//! Splitting composite paths into a container locator and an inner path.
//!
//! A composite path such as `s3://bucket/data.zip/reports/q1.csv` names two
//! things at once: the container (`s3://bucket/data.zip`), which is resolved
//! by some other filesystem, and the entry inside it (`reports/q1.csv`).
//! Where one ends and the other begins is decided by a [`Separator`] policy.
//!
//! Only the first occurrence of the token or suffix is honored, so
//! `a.zip.zip/x` is rejected rather than split at the second `.zip`. Nested
//! containers are addressed by composing composite paths, never by deeper
//! parsing here.

use crate::{Error, Result};

/// Separator between entries inside a container.
pub const ENTRY_SEPARATOR: char = '/';

/// Inner path meaning "every entry in the container".
pub const RECURSIVE_WILDCARD: &str = "**";

/// How to find the boundary between container locator and inner path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Separator {
    /// A literal token that is removed from the locator; the inner path is
    /// whatever follows it, minus one leading `/`.
    Token(String),
    /// A container suffix (e.g. `.zip`) that stays part of the locator and
    /// must be followed by `/` or the end of the path.
    Suffix(String),
}

/// Result of splitting a composite path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath {
    /// The container locator, handed as-is to the underlying filesystem.
    pub locator: String,
    /// The `/`-separated entry path inside the container.
    ///
    /// `**` when the path names the whole container; may be empty when the
    /// marker is followed by a lone separator.
    pub inner: String,
}

impl SplitPath {
    fn new(locator: &str, inner: &str) -> Self {
        Self {
            locator: locator.to_string(),
            inner: inner.to_string(),
        }
    }

    /// Returns true if the inner path addresses the whole container.
    pub fn is_whole_container(&self) -> bool {
        self.inner == RECURSIVE_WILDCARD
    }
}

/// Splits a composite path (with its scheme prefix already removed).
///
/// # Errors
///
/// With a [`Separator::Suffix`] policy, returns [`Error::MalformedPath`] if
/// the suffix does not occur at all, or if its first occurrence is followed
/// by anything other than `/` or the end of the path. A
/// [`Separator::Token`] policy never fails.
///
/// # Examples
///
/// ```
/// use zipvfs::archive_path::{Separator, split_archive_path};
///
/// let zip = Separator::Suffix(".zip".into());
/// let split = split_archive_path("data/a.zip/x/y.csv", &zip).unwrap();
/// assert_eq!(split.locator, "data/a.zip");
/// assert_eq!(split.inner, "x/y.csv");
///
/// let bang = Separator::Token("!".into());
/// let split = split_archive_path("https://host/a.tar!/x.csv", &bang).unwrap();
/// assert_eq!(split.locator, "https://host/a.tar");
/// assert_eq!(split.inner, "x.csv");
/// ```
pub fn split_archive_path(path: &str, separator: &Separator) -> Result<SplitPath> {
    let split = match separator {
        Separator::Token(token) => split_on_token(path, token),
        Separator::Suffix(suffix) => split_on_suffix(path, suffix)?,
    };
    log::debug!(
        "split '{}' into container '{}' and entry '{}'",
        path,
        split.locator,
        split.inner
    );
    Ok(split)
}

fn split_on_token(path: &str, token: &str) -> SplitPath {
    // An empty token would match at offset zero and swallow the locator.
    let Some(pos) = path.find(token).filter(|_| !token.is_empty()) else {
        return SplitPath::new(path, RECURSIVE_WILDCARD);
    };

    let locator = &path[..pos];
    let rest = &path[pos + token.len()..];
    if rest.is_empty() {
        return SplitPath::new(locator, RECURSIVE_WILDCARD);
    }
    let inner = rest.strip_prefix(ENTRY_SEPARATOR).unwrap_or(rest);
    SplitPath::new(locator, inner)
}

fn split_on_suffix(path: &str, suffix: &str) -> Result<SplitPath> {
    let pos = path
        .find(suffix)
        .filter(|_| !suffix.is_empty())
        .ok_or_else(|| {
            Error::malformed_path(
                path,
                format!("could not find a '{}' archive to open", suffix),
            )
        })?;

    let end = pos + suffix.len();
    let rest = &path[end..];
    if rest.is_empty() {
        return Ok(SplitPath::new(path, RECURSIVE_WILDCARD));
    }

    match rest.strip_prefix(ENTRY_SEPARATOR) {
        Some(inner) => Ok(SplitPath::new(&path[..end], inner)),
        None => Err(Error::malformed_path(
            path,
            format!("could not find a valid path within the '{}' archive", suffix),
        )),
    }
}

/// Rewrites an inner path that uses a platform separator (e.g. `\`) to the
/// `/` separator used inside containers.
pub fn normalize_inner_path(inner: &str, platform_separator: &str) -> String {
    if platform_separator.is_empty() || platform_separator == "/" {
        inner.to_string()
    } else {
        inner.replace(platform_separator, "/")
    }
}

/// Splits an inner path into its `/`-separated segments.
///
/// An empty path yields a single empty segment, mirroring `str::split`.
pub fn segments(inner: &str) -> impl Iterator<Item = &str> {
    inner.split(ENTRY_SEPARATOR)
}
