//! Pruning configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest batch a single bulk delete accepts
pub const MAX_BATCH_SIZE: usize = 1000;

/// Suffix S3 uses for directory bucket names
const DIRECTORY_BUCKET_SUFFIX: &str = "--x-s3";

/// Configuration for one pruning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PruneConfig {
    /// Bucket holding the objects (required)
    pub bucket: String,
    /// Only objects under this prefix are considered
    pub prefix: String,
    /// Everything modified within this many days is kept (default: 30)
    pub retention_days: u32,
    /// Length of the weekly tier, ending at the retention cutoff (default: 365).
    /// `None` applies one-per-week to every age-filtered object.
    pub weekly_window_days: Option<u32>,
    /// Ask before each batch (default: true)
    pub interactive: bool,
    /// Give up waiting for an answer after this many seconds.
    /// `None` waits forever.
    pub confirm_timeout_secs: Option<u64>,
    /// Compute and report, but never delete (default: true)
    pub dry_run: bool,
    /// Keys per bulk delete, 1 to 1000 (default: 1000)
    pub batch_size: usize,
    /// Ask the store not to enumerate deleted keys (default: false)
    pub quiet: bool,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: String::new(),
            retention_days: 30,
            weekly_window_days: Some(365),
            interactive: true,
            confirm_timeout_secs: None,
            dry_run: true,
            batch_size: MAX_BATCH_SIZE,
            quiet: false,
        }
    }
}

impl PruneConfig {
    /// Config for `bucket` with every other field at its default
    pub fn for_bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Check the configuration before touching the store
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bucket = self.bucket.trim();
        if bucket.is_empty() {
            return Err(ConfigError::EmptyBucket);
        }
        if bucket.len() != self.bucket.len() {
            return Err(ConfigError::BucketWhitespace(self.bucket.clone()));
        }
        if bucket.ends_with(DIRECTORY_BUCKET_SUFFIX) {
            return Err(ConfigError::DirectoryBucket(bucket.to_string()));
        }
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(ConfigError::BatchSizeOutOfRange(self.batch_size));
        }
        if self.confirm_timeout_secs == Some(0) {
            return Err(ConfigError::ZeroConfirmTimeout);
        }
        Ok(())
    }

    pub fn confirm_timeout(&self) -> Option<Duration> {
        self.confirm_timeout_secs.map(Duration::from_secs)
    }

    /// True when the whole bucket is in scope
    pub fn is_whole_bucket(&self) -> bool {
        self.prefix.is_empty()
    }
}
