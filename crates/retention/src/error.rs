use thiserror::Error;

use crate::config::MAX_BATCH_SIZE;

/// Boxed source error from a store client
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Invalid configuration, detected before any store call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bucket cannot be an empty string")]
    EmptyBucket,

    #[error("bucket {0:?} has leading or trailing whitespace")]
    BucketWhitespace(String),

    #[error("bucket {0} is a directory bucket, which is not supported")]
    DirectoryBucket(String),

    #[error("batch_size must be between 1 and {max}, got {0}", max = MAX_BATCH_SIZE)]
    BatchSizeOutOfRange(usize),

    #[error("confirm_timeout_secs must be at least 1 when set")]
    ZeroConfirmTimeout,
}

/// Failure talking to the object store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing {bucket}/{prefix} failed: {source}")]
    List {
        bucket: String,
        prefix: String,
        #[source]
        source: BoxError,
    },

    #[error("bulk delete of {keys} objects in {bucket} failed: {source}")]
    Delete {
        bucket: String,
        keys: usize,
        #[source]
        source: BoxError,
    },

    #[error("store returned continuation token {token:?} twice")]
    StalledPagination { token: String },
}

impl StoreError {
    pub fn list(bucket: &str, prefix: &str, source: impl Into<BoxError>) -> Self {
        Self::List {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
            source: source.into(),
        }
    }

    pub fn delete(bucket: &str, keys: usize, source: impl Into<BoxError>) -> Self {
        Self::Delete {
            bucket: bucket.to_string(),
            keys,
            source: source.into(),
        }
    }
}

/// Fatal errors of a pruning run
///
/// Delete failures are not fatal; they are recorded per batch in the report.
#[derive(Debug, Error)]
pub enum PruneError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listing(#[from] StoreError),
}
