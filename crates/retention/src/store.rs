//! ObjectStore port - the two store operations the pipeline needs

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedObject {
    pub key: String,
    /// Missing when the store did not report a modification time
    pub last_modified: Option<DateTime<Utc>>,
}

impl ListedObject {
    pub fn new(key: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            last_modified: Some(last_modified),
        }
    }
}

/// A single page of a listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ListedObject>,
    /// Continuation token for the next page, `None` once the listing is done
    pub next_token: Option<String>,
}

/// Per-key failure reported by a bulk delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyError {
    pub key: String,
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Result of one bulk delete call
#[derive(Debug, Clone, Default)]
pub struct DeleteResponse {
    /// Keys reported as deleted. Empty for quiet deletes.
    pub deleted: Vec<String>,
    pub errors: Vec<KeyError>,
    /// HTTP-style status code of the call, when the store exposes one
    pub status: Option<u16>,
}

/// Remote object store
///
/// Listing is paginated: callers pass the token from the previous page until
/// `next_token` is `None`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of objects under `prefix`
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Delete up to 1000 keys in one call
    ///
    /// With `quiet` set, the response only enumerates failures.
    async fn delete_batch(
        &self,
        bucket: &str,
        keys: &[String],
        quiet: bool,
    ) -> Result<DeleteResponse, StoreError>;
}
