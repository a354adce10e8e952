//! Fuzz target for opening arbitrary bytes as a container.
//!
//! Exercises format detection, filter peeling and the ZIP/TAR header walk
//! through the same handle adapter the filesystem handlers use. Any outcome
//! other than a panic or hang is acceptable.
//!
//! Run with: cargo +nightly fuzz run container_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use zipvfs::format::{ContainerReader, FormatSupport};
use zipvfs::locate::read_entry_fully;
use zipvfs::{ArchiveConfig, Context, FileSystem, MemoryFile, MemoryFileSystem, OpenFlags};

fuzz_target!(|data: &[u8]| {
    let fs = MemoryFileSystem::new().with_file("input", MemoryFile::new(data.to_vec()));
    let config = ArchiveConfig::default();
    let ctx = Context::new(&fs, &config);

    for support in [FormatSupport::All, FormatSupport::Raw] {
        let Ok(handle) = fs.open_file("input", OpenFlags::READ, &ctx) else {
            return;
        };
        let Ok(mut reader) = ContainerReader::open(handle, support) else {
            continue;
        };
        // Read the first listable entry to drive the decoders as well.
        let _ = reader.find_entry(|h| h.is_listable(), read_entry_fully);
    }
});
