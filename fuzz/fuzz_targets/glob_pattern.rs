//! Fuzz target for inner-path glob patterns.
//!
//! Run with: cargo +nightly fuzz run glob_pattern
//!
//! The input is split at the first NUL byte into a pattern and an entry
//! name; parsing and matching must never panic, and a pattern without
//! metacharacters must match itself.

#![no_main]

use libfuzzer_sys::fuzz_target;
use zipvfs::glob::{GlobPattern, has_glob};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (pattern, entry) = text.split_once('\0').unwrap_or((text, text));

    let Ok(parsed) = GlobPattern::parse(pattern) else {
        return;
    };
    let _ = parsed.matches(entry);

    if !has_glob(pattern) {
        assert!(parsed.matches(pattern), "literal pattern does not match itself: {:?}", pattern);
    }
});
