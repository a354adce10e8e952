//! Fuzz target for splitting composite paths.
//!
//! Run with: cargo +nightly fuzz run archive_path
//!
//! Properties checked for every split that succeeds:
//! - the locator is a prefix of the input
//! - splitting the locator again yields the same locator and `**`

#![no_main]

use libfuzzer_sys::fuzz_target;
use zipvfs::archive_path::{Separator, split_archive_path};

fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };

    let policies = [
        Separator::Suffix(".zip".to_string()),
        Separator::Token("!".to_string()),
        Separator::Token("::".to_string()),
    ];
    for separator in &policies {
        let Ok(split) = split_archive_path(path, separator) else {
            continue;
        };
        assert!(path.starts_with(&split.locator), "locator not a prefix: {:?}", split);

        if split.locator.is_empty() {
            continue;
        }
        if let Ok(again) = split_archive_path(&split.locator, separator) {
            assert_eq!(again.locator, split.locator);
            assert!(again.is_whole_container(), "resplit found an entry: {:?}", again);
        }
    }
});
