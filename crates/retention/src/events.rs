//! Diagnostic events emitted by a pruning run
//!
//! The pipeline reports every decision through an [`EventSink`] handed to
//! [`crate::Pruner::run`]. The CLI plugs in [`TracingSink`]; tests use
//! [`RecordingSink`].

use crate::batch::SkipReason;
use crate::buckets::{BucketKey, Granularity};
use crate::store::KeyError;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

/// One material decision of a run
#[derive(Debug, Clone, PartialEq)]
pub enum PruneEvent {
    Started {
        bucket: String,
        prefix: String,
        dry_run: bool,
        interactive: bool,
    },
    /// No prefix: the whole bucket is in scope
    WholeBucket { bucket: String },
    PageListed { page: usize, objects: usize },
    UndatedObjectSkipped { key: String },
    Listed {
        objects: usize,
        pages: usize,
        directory_markers: usize,
        undated: usize,
    },
    Cutoff {
        cutoff: DateTime<Utc>,
        retention_days: u32,
    },
    /// Start of the weekly tier; `None` when it covers all actionable objects
    WeeklyWindow { since: Option<DateTime<Utc>> },
    Actionable { count: usize },
    Kept {
        granularity: Granularity,
        bucket: BucketKey,
        key: String,
        last_modified: DateTime<Utc>,
        bucket_size: usize,
    },
    /// Candidates left once a pass' keeps are removed
    Reduced {
        granularity: Granularity,
        remaining: usize,
    },
    Retained { key: String },
    Planned { candidates: usize, batches: usize },
    BatchSkipped { batch: usize, reason: SkipReason },
    BatchDryRun { batch: usize, keys: Vec<String> },
    BatchDeleted {
        batch: usize,
        requested: usize,
        deleted: usize,
        status: Option<u16>,
    },
    KeyNotDeleted { batch: usize, error: KeyError },
    BatchFailed { batch: usize, error: String },
    Finished {
        deleted: usize,
        skipped_batches: usize,
        failed_batches: usize,
    },
}

/// Receiver of [`PruneEvent`]s, scoped to one run
pub trait EventSink: Send {
    fn emit(&mut self, event: PruneEvent);
}

/// Sink writing events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: PruneEvent) {
        match event {
            PruneEvent::Started {
                bucket,
                prefix,
                dry_run,
                interactive,
            } => info!(%bucket, %prefix, dry_run, interactive, "Pruning started"),
            PruneEvent::WholeBucket { bucket } => {
                warn!(%bucket, "No prefix given, this will operate on the entire bucket")
            }
            PruneEvent::PageListed { page, objects } => debug!(page, objects, "Listed page"),
            PruneEvent::UndatedObjectSkipped { key } => {
                warn!(%key, "Object has no modification time, keeping it")
            }
            PruneEvent::Listed {
                objects,
                pages,
                directory_markers,
                undated,
            } => info!(
                objects,
                pages, directory_markers, undated, "Found {} objects, sorted oldest first", objects
            ),
            PruneEvent::Cutoff {
                cutoff,
                retention_days,
            } => info!(
                retention_days,
                "Acting on objects last modified before {}",
                cutoff.format("%F at %T")
            ),
            PruneEvent::WeeklyWindow { since: Some(since) } => {
                info!("Keeping one object per week since {}", since.format("%F at %T"))
            }
            PruneEvent::WeeklyWindow { since: None } => {
                info!("Keeping one object per week for all actionable objects")
            }
            PruneEvent::Actionable { count } => info!(count, "Found {} actionable objects", count),
            PruneEvent::Kept {
                granularity,
                bucket,
                key,
                last_modified,
                bucket_size,
            } => {
                info!(%granularity, %bucket, bucket_size, "Keeping object for {} {}", granularity, bucket);
                debug!(%key, %last_modified, "Kept object");
            }
            PruneEvent::Reduced {
                granularity,
                remaining,
            } => info!(%granularity, remaining, "Actionable objects reduced to {}", remaining),
            PruneEvent::Retained { key } => debug!(%key, "Retained"),
            PruneEvent::Planned {
                candidates,
                batches,
            } => info!(candidates, batches, "Deletion planned"),
            PruneEvent::BatchSkipped { batch, reason } => {
                info!(batch, %reason, "Batch skipped")
            }
            PruneEvent::BatchDryRun { batch, keys } => {
                info!(batch, "Faked deleting {} objects", keys.len());
                debug!(batch, ?keys, "Supposedly deleted objects");
            }
            PruneEvent::BatchDeleted {
                batch,
                requested,
                deleted,
                status,
            } => warn!(batch, requested, ?status, "Deleted {} objects", deleted),
            PruneEvent::KeyNotDeleted { batch, error } => error!(
                batch,
                key = %error.key,
                code = ?error.code,
                message = ?error.message,
                "Object could not be deleted"
            ),
            PruneEvent::BatchFailed { batch, error } => {
                error!(batch, %error, "Batch deletion failed")
            }
            PruneEvent::Finished {
                deleted,
                skipped_batches,
                failed_batches,
            } => info!(deleted, skipped_batches, failed_batches, "Pruning finished"),
        }
    }
}

/// Sink keeping every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<PruneEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events matching a predicate
    pub fn matching(&self, predicate: impl Fn(&PruneEvent) -> bool) -> Vec<&PruneEvent> {
        self.events.iter().filter(|event| predicate(event)).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: PruneEvent) {
        self.events.push(event);
    }
}

/// Sink discarding everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: PruneEvent) {}
}
