//! In-memory object store for tests, benchmarks and local experiments
//!
//! Lists keys in lexicographic order like S3 does, pages with a start-after
//! token, and can be told to fail specific calls.

use crate::error::StoreError;
use crate::store::{DeleteResponse, KeyError, ListPage, ListedObject, ObjectStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<String, Option<DateTime<Utc>>>,
    list_calls: usize,
    delete_calls: usize,
    deleted_batches: Vec<Vec<String>>,
    refused: HashSet<String>,
    failing_deletes: HashSet<usize>,
    failing_listing: Option<String>,
    stalled: bool,
}

/// Single-bucket store held in memory
#[derive(Debug)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    page_size: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Store returning at most `page_size` objects per listing page
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            page_size: page_size.max(1),
        }
    }

    pub fn insert(&self, key: impl Into<String>, last_modified: DateTime<Utc>) {
        self.inner
            .lock()
            .objects
            .insert(key.into(), Some(last_modified));
    }

    /// Insert an object listed without a modification time
    pub fn insert_undated(&self, key: impl Into<String>) {
        self.inner.lock().objects.insert(key.into(), None);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().objects.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().objects.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().objects.keys().cloned().collect()
    }

    pub fn list_calls(&self) -> usize {
        self.inner.lock().list_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.inner.lock().delete_calls
    }

    /// Keys of every delete call, in call order
    pub fn deleted_batches(&self) -> Vec<Vec<String>> {
        self.inner.lock().deleted_batches.clone()
    }

    /// Report `key` as a per-key error on every delete
    pub fn refuse_key(&self, key: impl Into<String>) {
        self.inner.lock().refused.insert(key.into());
    }

    /// Fail the `call`-th delete call (1-based) as a whole
    pub fn fail_delete_call(&self, call: usize) {
        self.inner.lock().failing_deletes.insert(call);
    }

    /// Fail every listing call with `message`
    pub fn fail_listing(&self, message: impl Into<String>) {
        self.inner.lock().failing_listing = Some(message.into());
    }

    /// Keep handing out the same continuation token
    pub fn stall_pagination(&self) {
        self.inner.lock().stalled = true;
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let mut inner = self.inner.lock();
        inner.list_calls += 1;

        if let Some(message) = &inner.failing_listing {
            return Err(StoreError::list(bucket, prefix, message.clone()));
        }
        if inner.stalled {
            return Ok(ListPage {
                objects: Vec::new(),
                next_token: Some("stalled".to_string()),
            });
        }

        let mut matching = inner
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| token.map_or(true, |after| key.as_str() > after));

        let objects: Vec<ListedObject> = matching
            .by_ref()
            .take(self.page_size)
            .map(|(key, last_modified)| ListedObject {
                key: key.clone(),
                last_modified: *last_modified,
            })
            .collect();

        let next_token = match (matching.next(), objects.last()) {
            (Some(_), Some(last)) => Some(last.key.clone()),
            _ => None,
        };

        Ok(ListPage {
            objects,
            next_token,
        })
    }

    async fn delete_batch(
        &self,
        bucket: &str,
        keys: &[String],
        quiet: bool,
    ) -> Result<DeleteResponse, StoreError> {
        let mut inner = self.inner.lock();
        inner.delete_calls += 1;

        if inner.failing_deletes.contains(&inner.delete_calls) {
            return Err(StoreError::delete(bucket, keys.len(), "injected failure"));
        }
        inner.deleted_batches.push(keys.to_vec());

        let mut response = DeleteResponse {
            status: Some(200),
            ..DeleteResponse::default()
        };
        for key in keys {
            if inner.refused.contains(key) {
                response.errors.push(KeyError {
                    key: key.clone(),
                    code: Some("AccessDenied".to_string()),
                    message: Some("Access Denied".to_string()),
                });
                continue;
            }
            // Deleting a missing key succeeds, as on S3
            inner.objects.remove(key);
            if !quiet {
                response.deleted.push(key.clone());
            }
        }

        Ok(response)
    }
}
