//! Object records and the sorted object set

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Suffix that marks a key as a directory placeholder
pub const DIRECTORY_SEPARATOR: char = '/';

/// One stored object, as seen at listing time
///
/// Records are only produced by the collector from store listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectRecord {
    key: String,
    last_modified: DateTime<Utc>,
}

impl ObjectRecord {
    pub(crate) fn new(key: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            last_modified,
        }
    }

    /// Object key within the bucket
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store-assigned modification time
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }
}

/// Check whether a key is a directory placeholder
pub fn is_directory_marker(key: &str) -> bool {
    key.ends_with(DIRECTORY_SEPARATOR)
}

/// Read-only snapshot of a listing, sorted by `last_modified` ascending
///
/// Cloning is cheap and shares the same records. Later stages work on
/// borrowed views of [`ObjectSet::as_slice`], never on the set itself.
#[derive(Debug, Clone, Default)]
pub struct ObjectSet {
    records: Arc<[ObjectRecord]>,
}

impl ObjectSet {
    /// Freeze records into a set. Sorting is stable, so records sharing a
    /// timestamp keep their listing order.
    pub(crate) fn from_unsorted(mut records: Vec<ObjectRecord>) -> Self {
        records.sort_by_key(|record| record.last_modified);
        Self {
            records: records.into(),
        }
    }

    pub fn as_slice(&self) -> &[ObjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectRecord> {
        self.records.iter()
    }

    /// Newest record, if any
    pub fn newest(&self) -> Option<&ObjectRecord> {
        self.records.last()
    }
}

impl<'a> IntoIterator for &'a ObjectSet {
    type Item = &'a ObjectRecord;
    type IntoIter = std::slice::Iter<'a, ObjectRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
