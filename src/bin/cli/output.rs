//! Output formatting for CLI operations.

use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use zipvfs::FileType;

/// What `stat` reports about one file.
pub struct FileStat {
    pub path: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub file_type: FileType,
    pub on_disk: bool,
    pub seekable: bool,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats glob results
    fn format_paths(&self, paths: &[String]) -> String;

    /// Formats an existence check
    fn format_exists(&self, path: &str, exists: bool) -> String;

    /// Formats file metadata
    fn format_stat(&self, stat: &FileStat) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_paths(&self, paths: &[String]) -> String {
        let mut output = String::new();
        for path in paths {
            output.push_str(path);
            output.push('\n');
        }
        output
    }

    fn format_exists(&self, path: &str, exists: bool) -> String {
        format!("{}: {}\n", path, if exists { "exists" } else { "not found" })
    }

    fn format_stat(&self, stat: &FileStat) -> String {
        let mut output = String::new();
        output.push_str(&format!("  Path:      {}\n", stat.path));
        output.push_str(&format!(
            "  Size:      {} ({} bytes)\n",
            humanize_bytes(stat.size),
            stat.size
        ));
        output.push_str(&format!(
            "  Modified:  {}\n",
            stat.modified
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string())
        ));
        output.push_str(&format!("  Type:      {:?}\n", stat.file_type));
        output.push_str(&format!(
            "  On disk:   {}\n",
            if stat.on_disk { "Yes" } else { "No" }
        ));
        output.push_str(&format!(
            "  Seekable:  {}\n",
            if stat.seekable { "Yes" } else { "No" }
        ));
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_paths(&self, paths: &[String]) -> String {
        serde_json::to_string_pretty(paths).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_exists(&self, path: &str, exists: bool) -> String {
        let obj = json!({ "path": path, "exists": exists });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_stat(&self, stat: &FileStat) -> String {
        let obj = json!({
            "path": stat.path,
            "size": stat.size,
            "modified": stat
                .modified
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs()),
            "file_type": format!("{:?}", stat.file_type),
            "on_disk": stat.on_disk,
            "seekable": stat.seekable,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Formats a SystemTime as seconds since the Unix epoch, UTC.
pub fn format_timestamp(time: SystemTime) -> String {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => format!("{} (unix)", duration.as_secs()),
        Err(_) => "-".to_string(),
    }
}
