//! Session configuration consumed by the path splitter.

use crate::archive_path::Separator;

/// Default container suffix used when no split token is configured.
pub const DEFAULT_EXTENSION: &str = ".zip";

/// Configuration for splitting composite paths into container and entry.
///
/// An explicit split token, when set, always takes precedence over the
/// suffix fallback.
///
/// # Example
///
/// ```rust
/// use zipvfs::ArchiveConfig;
/// use zipvfs::archive_path::Separator;
///
/// let config = ArchiveConfig::default();
/// assert_eq!(config.separator(), Separator::Suffix(".zip".into()));
///
/// let config = ArchiveConfig::default().split("!");
/// assert_eq!(config.separator(), Separator::Token("!".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Literal token separating the container locator from the inner path.
    pub split: Option<String>,
    /// Container suffix used when no split token is set.
    pub extension: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            split: None,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl ArchiveConfig {
    /// Creates the default configuration (no split token, `.zip` suffix).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the explicit split token.
    ///
    /// An empty token is ignored since it would match at offset zero.
    pub fn split(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.split = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Sets the container suffix used when no split token is configured.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Returns the separator policy in effect.
    pub fn separator(&self) -> Separator {
        match &self.split {
            Some(token) => Separator::Token(token.clone()),
            None => Separator::Suffix(self.extension.clone()),
        }
    }

    /// Returns the text inserted between container locator and entry name
    /// when building composite paths for glob results.
    ///
    /// The split token is stripped from locators, so it is re-inserted; a
    /// suffix stays part of the locator and needs nothing extra.
    pub fn result_infix(&self) -> &str {
        self.split.as_deref().unwrap_or("")
    }
}
