//! Dispatching filesystem that routes composite paths to container handlers.

use std::sync::RwLock;

use super::{Context, FileHandle, FileSystem, LocalFileSystem, OpenFlags};
use crate::fs::{ArchiveFileSystem, RawArchiveFileSystem, StreamFileSystem, ZipFileSystem};
use crate::{ArchiveConfig, Result};

/// The entry point for reading through containers.
///
/// Handlers are consulted in registration order; the first whose
/// `can_handle_file` accepts a path serves it. Unclaimed paths go to the base
/// filesystem. Container handlers resolve their locators through this same
/// filesystem, so composite paths nest naturally.
///
/// # Example
///
/// ```rust,no_run
/// use zipvfs::{ArchiveConfig, OpenFlags, VirtualFileSystem};
///
/// let vfs = VirtualFileSystem::new();
/// vfs.set_config(ArchiveConfig::default().split("!"));
/// let mut handle = vfs.open_file("archive://data/logs.tar.gz!/2024/app.log", OpenFlags::READ)?;
/// let mut buf = vec![0u8; handle.size()? as usize];
/// handle.read(&mut buf)?;
/// # Ok::<(), zipvfs::Error>(())
/// ```
pub struct VirtualFileSystem {
    handlers: Vec<Box<dyn FileSystem>>,
    base: Box<dyn FileSystem>,
    config: RwLock<ArchiveConfig>,
}

impl VirtualFileSystem {
    /// Creates a filesystem over local disk with every container handler
    /// registered.
    pub fn new() -> Self {
        Self::with_base(Box::new(LocalFileSystem::new()))
    }

    /// Creates a filesystem over the given base with every container handler
    /// registered.
    pub fn with_base(base: Box<dyn FileSystem>) -> Self {
        let mut vfs = Self::bare(base);
        vfs.register(Box::new(ArchiveFileSystem::new()));
        vfs.register(Box::new(ZipFileSystem::new()));
        vfs.register(Box::new(RawArchiveFileSystem::new()));
        vfs.register(Box::new(StreamFileSystem::bzip2()));
        vfs.register(Box::new(StreamFileSystem::xz()));
        vfs
    }

    /// Creates a filesystem over the given base with no handlers.
    pub fn bare(base: Box<dyn FileSystem>) -> Self {
        Self {
            handlers: Vec::new(),
            base,
            config: RwLock::new(ArchiveConfig::default()),
        }
    }

    /// Registers a handler after those already present.
    pub fn register(&mut self, handler: Box<dyn FileSystem>) {
        log::debug!("registering filesystem handler {}", handler.name());
        self.handlers.push(handler);
    }

    /// Replaces the session configuration for subsequent calls.
    pub fn set_config(&self, config: ArchiveConfig) {
        let mut current = self.config.write().unwrap_or_else(|e| e.into_inner());
        *current = config;
    }

    /// Returns a copy of the session configuration.
    pub fn config(&self) -> ArchiveConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns the filesystem that will serve `path`.
    pub fn resolve(&self, path: &str) -> &dyn FileSystem {
        self.handlers
            .iter()
            .find(|h| h.can_handle_file(path))
            .map(|h| h.as_ref())
            .unwrap_or(self.base.as_ref())
    }

    /// Opens a file using the current session configuration.
    pub fn open_file(&self, path: &str, flags: OpenFlags) -> Result<Box<dyn FileHandle>> {
        let config = self.config();
        FileSystem::open_file(self, path, flags, &Context::new(self, &config))
    }

    /// Checks whether a file exists using the current session configuration.
    pub fn file_exists(&self, path: &str) -> Result<bool> {
        let config = self.config();
        FileSystem::file_exists(self, path, &Context::new(self, &config))
    }

    /// Expands a pattern using the current session configuration.
    pub fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let config = self.config();
        FileSystem::glob(self, pattern, &Context::new(self, &config))
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VirtualFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("VirtualFileSystem")
            .field("handlers", &names)
            .field("base", &self.base.name())
            .field("config", &self.config())
            .finish()
    }
}

impl FileSystem for VirtualFileSystem {
    fn name(&self) -> &str {
        "VirtualFileSystem"
    }

    fn can_handle_file(&self, _path: &str) -> bool {
        true
    }

    fn open_file(
        &self,
        path: &str,
        flags: OpenFlags,
        ctx: &Context<'_>,
    ) -> Result<Box<dyn FileHandle>> {
        self.resolve(path).open_file(path, flags, ctx)
    }

    fn file_exists(&self, path: &str, ctx: &Context<'_>) -> Result<bool> {
        self.resolve(path).file_exists(path, ctx)
    }

    fn glob(&self, pattern: &str, ctx: &Context<'_>) -> Result<Vec<String>> {
        self.resolve(pattern).glob(pattern, ctx)
    }

    fn path_separator(&self) -> &str {
        self.base.path_separator()
    }
}
