//! TOML configuration file
//!
//! Every table is optional. Command-line flags override file values.

use anyhow::{Context, Result};
use retention::PruneConfig;
use s3_store::S3Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// Everything `reducer` can read from its config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub prune: PruneConfig,
    pub s3: S3Config,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// One of off, critical, error, warning, info, debug, trace (default: warning)
    pub level: String,
    /// Also write logs to this file, without colors
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warning".to_string(),
            file: None,
        }
    }
}

impl LogSettings {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        parse_level(&self.level).map_err(anyhow::Error::msg)
    }
}

/// Parse a log level name
///
/// Accepts `tracing`'s names plus `critical` and `warning`.
pub fn parse_level(name: &str) -> Result<LevelFilter, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "critical" => Ok(LevelFilter::ERROR),
        "warning" => Ok(LevelFilter::WARN),
        other => other
            .parse()
            .map_err(|_| format!("unknown log level: {name}")),
    }
}

/// Load settings from `path`, or defaults when no file is given
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Commented example configuration
pub fn example_config() -> &'static str {
    r#"# reducer configuration
#
# Every key is optional; command-line flags take precedence.

[prune]
# Bucket holding the backups
bucket = "my-backups"

# Only objects under this prefix are considered ("" = whole bucket)
prefix = "db/"

# Objects modified within this many days are always kept
retention_days = 30

# Keep one object per week for this many days before the retention cutoff.
# Older objects keep one per year. Use --unbounded-weekly to cover everything.
weekly_window_days = 365

# Ask before deleting each batch
interactive = true

# Skip a batch when nobody answers within this many seconds
# confirm_timeout_secs = 300

# Report what would be deleted without deleting anything
dry_run = true

# Keys per bulk delete request (1-1000)
batch_size = 1000

# Do not ask S3 to list every deleted key
quiet = false

[s3]
# region = "eu-west-1"
# profile = "backup-admin"
# endpoint = "http://localhost:9000"
force_path_style = false

[log]
# off, critical, error, warning, info, debug, trace
level = "warning"
# file = "/var/log/reducer.log"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_example_config_parses() {
        let settings: Settings = toml::from_str(example_config()).unwrap();

        assert_eq!(settings.prune.bucket, "my-backups");
        assert_eq!(settings.prune.prefix, "db/");
        assert_eq!(settings.prune.weekly_window_days, Some(365));
        assert!(settings.prune.dry_run);
        assert!(settings.s3.region.is_none());
        assert_eq!(settings.log.level_filter().unwrap(), LevelFilter::WARN);
    }

    #[test]
    fn test_missing_tables_use_defaults() {
        let settings: Settings = toml::from_str("[prune]\nbucket = \"b\"\n").unwrap();

        assert_eq!(settings.prune, PruneConfig::for_bucket("b"));
        assert_eq!(settings.s3, S3Config::default());
        assert_eq!(settings.log, LogSettings::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<Settings, _> = toml::from_str("[prune]\nretain_days = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(load(None).unwrap(), Settings::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[prune]\nbucket = \"nightly\"\nretention_days = 7").unwrap();

        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.prune.bucket, "nightly");
        assert_eq!(settings.prune.retention_days, 7);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load(Some(Path::new("/nonexistent/reducer.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[rstest]
    #[case("critical", LevelFilter::ERROR)]
    #[case("ERROR", LevelFilter::ERROR)]
    #[case("warning", LevelFilter::WARN)]
    #[case("warn", LevelFilter::WARN)]
    #[case(" info ", LevelFilter::INFO)]
    #[case("debug", LevelFilter::DEBUG)]
    #[case("off", LevelFilter::OFF)]
    fn test_parse_level(#[case] name: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_level(name).unwrap(), expected);
    }

    #[test]
    fn test_parse_level_rejects_garbage() {
        assert!(parse_level("loud").is_err());
    }
}
