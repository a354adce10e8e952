//! Command implementations for the CLI tool.

use std::io::Write;

use zipvfs::{Error, OpenFlags, VirtualFileSystem};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{FileStat, create_formatter};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

fn report(error: &Error) -> ExitCode {
    eprintln!("Error: {}", error);
    error_to_exit_code(error)
}

/// Cat command implementation
pub fn cat(vfs: &VirtualFileSystem, path: &str) -> ExitCode {
    let mut handle = match vfs.open_file(path, OpenFlags::READ) {
        Ok(h) => h,
        Err(e) => return report(&e),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let n = match handle.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => return report(&e),
        };
        if let Err(e) = out.write_all(&buf[..n]) {
            return report(&Error::Io(e));
        }
    }
    if let Err(e) = out.flush() {
        return report(&Error::Io(e));
    }
    ExitCode::Success
}

/// Ls command implementation
pub fn ls(vfs: &VirtualFileSystem, pattern: &str, format: OutputFormat) -> ExitCode {
    let paths = match vfs.glob(pattern) {
        Ok(p) => p,
        Err(e) => return report(&e),
    };
    print!("{}", create_formatter(format).format_paths(&paths));
    if format == OutputFormat::Json {
        println!();
    }
    ExitCode::Success
}

/// Exists command implementation
pub fn exists(vfs: &VirtualFileSystem, path: &str, format: OutputFormat) -> ExitCode {
    let exists = match vfs.file_exists(path) {
        Ok(found) => found,
        Err(e) => return report(&e),
    };
    print!("{}", create_formatter(format).format_exists(path, exists));
    if format == OutputFormat::Json {
        println!();
    }
    if exists {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    }
}

/// Stat command implementation
pub fn stat(vfs: &VirtualFileSystem, path: &str, format: OutputFormat) -> ExitCode {
    let handle = match vfs.open_file(path, OpenFlags::READ) {
        Ok(h) => h,
        Err(e) => return report(&e),
    };
    let size = match handle.size() {
        Ok(s) => s,
        Err(e) => return report(&e),
    };
    let modified = match handle.last_modified() {
        Ok(t) => Some(t),
        Err(e) if e.is_unsupported() => None,
        Err(e) => return report(&e),
    };

    let stat = FileStat {
        path: handle.path().to_string(),
        size,
        modified,
        file_type: handle.file_type(),
        on_disk: handle.on_disk(),
        seekable: handle.can_seek(),
    };
    print!("{}", create_formatter(format).format_stat(&stat));
    if format == OutputFormat::Json {
        println!();
    }
    ExitCode::Success
}
