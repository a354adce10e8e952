//! Glob matching of inner paths against a container's entry listing.
//!
//! Patterns are matched one `/`-separated segment at a time, each segment
//! with [`glob::Pattern`]. A `**` segment matches any remaining depth and is
//! only allowed at the end of a pattern. Without a trailing `**`, an entry
//! must have exactly as many segments as the pattern.

use std::ops::ControlFlow;

use crate::archive_path::{RECURSIVE_WILDCARD, segments};
use crate::format::ContainerReader;
use crate::{Error, Result};

/// Returns true if `path` contains glob metacharacters.
pub fn has_glob(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Wildcard(glob::Pattern),
    Recursive,
}

/// A parsed inner-path pattern.
///
/// # Example
///
/// ```rust
/// use zipvfs::glob::GlobPattern;
///
/// let pattern = GlobPattern::parse("a/*.txt").unwrap();
/// assert!(pattern.matches("a/x.txt"));
/// assert!(!pattern.matches("a/b/z.txt"));
///
/// let pattern = GlobPattern::parse("a/**").unwrap();
/// assert!(pattern.matches("a/b/c.txt"));
///
/// assert!(GlobPattern::parse("**/x.txt").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    segments: Vec<Segment>,
}

impl GlobPattern {
    /// Parses a `/`-separated pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGlob`] if `**` appears anywhere but the last
    /// segment, or a segment is not a valid glob.
    pub fn parse(pattern: &str) -> Result<Self> {
        let parts: Vec<&str> = segments(pattern).collect();
        let last = parts.len() - 1;
        let mut compiled = Vec::with_capacity(parts.len());
        for (i, part) in parts.into_iter().enumerate() {
            let segment = if part == RECURSIVE_WILDCARD {
                if i != last {
                    return Err(Error::InvalidGlob(format!(
                        "recursive globs are only supported at the end of archive path patterns: '{}'",
                        pattern
                    )));
                }
                Segment::Recursive
            } else if has_glob(part) {
                let compiled = glob::Pattern::new(part)
                    .map_err(|e| Error::InvalidGlob(format!("'{}': {}", pattern, e)))?;
                Segment::Wildcard(compiled)
            } else {
                Segment::Literal(part.to_string())
            };
            compiled.push(segment);
        }
        Ok(Self {
            source: pattern.to_string(),
            segments: compiled,
        })
    }

    /// Returns the pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a pattern has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if `entry` (a `/`-separated entry name) matches.
    pub fn matches(&self, entry: &str) -> bool {
        let parts: Vec<&str> = segments(entry).collect();
        if parts.len() < self.segments.len() {
            return false;
        }
        for (segment, part) in self.segments.iter().zip(&parts) {
            let ok = match segment {
                Segment::Recursive => return true,
                Segment::Literal(literal) => literal == part,
                Segment::Wildcard(pattern) => pattern.matches(part),
            };
            if !ok {
                return false;
            }
        }
        parts.len() == self.segments.len()
    }
}

/// Lists every entry of `reader` matching `pattern`, each prefixed with
/// `prefix` to form a fully-qualified composite path.
///
/// Directory and encrypted entries are never returned.
pub fn match_entries(
    reader: &mut ContainerReader,
    pattern: &GlobPattern,
    prefix: &str,
) -> Result<Vec<String>> {
    let mut result = Vec::new();
    reader.for_each_entry(|header| {
        if header.is_listable() && pattern.matches(&header.name) {
            result.push(format!("{}{}", prefix, header.name));
        }
        Ok(ControlFlow::Continue(()))
    })?;
    log::debug!(
        "pattern '{}' matched {} entries in '{}'",
        pattern.as_str(),
        result.len(),
        reader.locator()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_glob() {
        assert!(has_glob("*.csv"));
        assert!(has_glob("a?.csv"));
        assert!(has_glob("[ab].csv"));
        assert!(!has_glob("a/b.csv"));
        assert!(!has_glob("https://host/a.zip"));
    }

    #[test]
    fn test_single_level_wildcard() {
        let p = GlobPattern::parse("a/*.txt").unwrap();
        assert!(p.matches("a/x.txt"));
        assert!(p.matches("a/y.txt"));
        assert!(!p.matches("a/b/z.txt"));
        assert!(!p.matches("a"));
        assert!(!p.matches("b/x.txt"));
    }

    #[test]
    fn test_trailing_recursive() {
        let p = GlobPattern::parse("a/**").unwrap();
        assert!(p.matches("a/b/c.txt"));
        assert!(p.matches("a/x.txt"));
        assert!(!p.matches("a"));
        assert!(!p.matches("b/x.txt"));

        let all = GlobPattern::parse("**").unwrap();
        assert!(all.matches("x"));
        assert!(all.matches("deep/ly/nested/x"));
    }

    #[test]
    fn test_recursive_not_last_rejected() {
        for pattern in ["*/**/x", "**/x.txt", "a/**/b/**"] {
            let err = GlobPattern::parse(pattern).unwrap_err();
            assert!(matches!(err, Error::InvalidGlob(_)), "{pattern}");
        }
    }

    #[test]
    fn test_invalid_segment_rejected() {
        let err = GlobPattern::parse("a/[unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidGlob(_)));
    }

    #[test]
    fn test_literal_segments_are_exact() {
        let p = GlobPattern::parse("data/report.csv").unwrap();
        assert!(p.matches("data/report.csv"));
        assert!(!p.matches("data/report.csv.bak"));
        assert!(!p.matches("data/report.csv/x"));
    }

    #[test]
    fn test_question_and_class() {
        let p = GlobPattern::parse("log?/[ab].txt").unwrap();
        assert!(p.matches("log1/a.txt"));
        assert!(p.matches("logs/b.txt"));
        assert!(!p.matches("log12/a.txt"));
        assert!(!p.matches("log1/c.txt"));
    }

    #[test]
    fn test_len() {
        assert_eq!(GlobPattern::parse("a/b/*").unwrap().len(), 3);
        assert!(!GlobPattern::parse("").unwrap().is_empty());
    }
}
