//! Shared helpers for CLI commands

use chrono::{DateTime, Utc};

/// Resolve a `--flag` / `--no-flag` pair; `None` when neither was given
pub fn tri_state(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// `s3://bucket/prefix` for display
pub fn location(bucket: &str, prefix: &str) -> String {
    format!("s3://{bucket}/{prefix}")
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS UTC`
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
