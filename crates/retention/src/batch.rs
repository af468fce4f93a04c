//! Batched, confirmable deletion

use crate::config::{PruneConfig, MAX_BATCH_SIZE};
use crate::error::StoreError;
use crate::events::{EventSink, PruneEvent};
use crate::object::ObjectRecord;
use crate::prompt::{is_affirmative, Answer, ConfirmRequest, Prompt};
use crate::report::BatchReport;
use crate::store::{KeyError, ObjectStore};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Split `items` into consecutive batches of at most `size`
///
/// `size` is clamped to 1..=[`MAX_BATCH_SIZE`].
pub fn batches<T>(items: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(size.clamp(1, MAX_BATCH_SIZE))
}

/// Number of batches [`batches`] yields
pub fn batch_count(items: usize, size: usize) -> usize {
    items.div_ceil(size.clamp(1, MAX_BATCH_SIZE))
}

/// Why a batch was left alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Operator gave a non-affirmative answer
    Declined { answer: String },
    /// No answer before the confirmation timeout
    TimedOut,
    /// Input closed before an answer
    InputClosed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Declined { answer } => write!(f, "declined ({answer:?})"),
            SkipReason::TimedOut => f.write_str("confirmation timed out"),
            SkipReason::InputClosed => f.write_str("input closed"),
        }
    }
}

/// What happened to one batch
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Dry run: nothing was sent to the store
    DryRun,
    Skipped {
        reason: SkipReason,
    },
    Deleted {
        deleted: usize,
        errors: Vec<KeyError>,
        /// HTTP status of the bulk delete call
        #[serde(rename = "http_status")]
        status: Option<u16>,
    },
    Failed {
        #[serde(serialize_with = "display")]
        error: StoreError,
    },
}

impl BatchOutcome {
    /// Objects the store confirmed as deleted
    pub fn deleted(&self) -> usize {
        match self {
            BatchOutcome::Deleted { deleted, .. } => *deleted,
            _ => 0,
        }
    }

    /// The call failed or some keys were refused
    pub fn has_failures(&self) -> bool {
        match self {
            BatchOutcome::Failed { .. } => true,
            BatchOutcome::Deleted { errors, .. } => !errors.is_empty(),
            _ => false,
        }
    }
}

fn display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Deletes candidates batch by batch
///
/// Batches run one after another. A failed batch is recorded and the next
/// one still runs.
pub struct BatchDeleter<'a> {
    store: &'a dyn ObjectStore,
    prompt: &'a dyn Prompt,
    bucket: &'a str,
    batch_size: usize,
    interactive: bool,
    dry_run: bool,
    quiet: bool,
    confirm_timeout: Option<Duration>,
}

impl<'a> BatchDeleter<'a> {
    pub fn new(store: &'a dyn ObjectStore, prompt: &'a dyn Prompt, config: &'a PruneConfig) -> Self {
        Self {
            store,
            prompt,
            bucket: &config.bucket,
            batch_size: config.batch_size,
            interactive: config.interactive,
            dry_run: config.dry_run,
            quiet: config.quiet,
            confirm_timeout: config.confirm_timeout(),
        }
    }

    /// Process every batch of `candidates` in order
    pub async fn run(
        &self,
        candidates: &[&ObjectRecord],
        sink: &mut dyn EventSink,
    ) -> Vec<BatchReport> {
        let total = batch_count(candidates.len(), self.batch_size);
        let mut reports = Vec::with_capacity(total);

        for (i, batch) in batches(candidates, self.batch_size).enumerate() {
            let keys: Vec<String> = batch.iter().map(|record| record.key().to_string()).collect();
            let outcome = self.process(i + 1, total, &keys, sink).await;
            reports.push(BatchReport {
                batch: i + 1,
                keys,
                outcome,
            });
        }

        reports
    }

    /// Confirm, then fake or perform the deletion of one batch
    pub async fn process(
        &self,
        batch: usize,
        batches: usize,
        keys: &[String],
        sink: &mut dyn EventSink,
    ) -> BatchOutcome {
        // 1. Ask the operator
        if self.interactive {
            let request = ConfirmRequest {
                batch,
                batches,
                keys: keys.len(),
                dry_run: self.dry_run,
                timeout: self.confirm_timeout,
            };
            let skip = match self.prompt.ask(&request).await {
                Answer::Text(answer) if is_affirmative(&answer) => None,
                Answer::Text(answer) => Some(SkipReason::Declined { answer }),
                Answer::TimedOut => Some(SkipReason::TimedOut),
                Answer::Closed => Some(SkipReason::InputClosed),
            };
            if let Some(reason) = skip {
                sink.emit(PruneEvent::BatchSkipped {
                    batch,
                    reason: reason.clone(),
                });
                return BatchOutcome::Skipped { reason };
            }
        }

        // 2. Dry run stops here
        if self.dry_run {
            sink.emit(PruneEvent::BatchDryRun {
                batch,
                keys: keys.to_vec(),
            });
            return BatchOutcome::DryRun;
        }

        // 3. One bulk delete for the whole batch
        match self.store.delete_batch(self.bucket, keys, self.quiet).await {
            Ok(response) => {
                let deleted = if self.quiet {
                    keys.len().saturating_sub(response.errors.len())
                } else {
                    response.deleted.len()
                };
                sink.emit(PruneEvent::BatchDeleted {
                    batch,
                    requested: keys.len(),
                    deleted,
                    status: response.status,
                });
                for error in &response.errors {
                    sink.emit(PruneEvent::KeyNotDeleted {
                        batch,
                        error: error.clone(),
                    });
                }
                BatchOutcome::Deleted {
                    deleted,
                    errors: response.errors,
                    status: response.status,
                }
            }
            Err(error) => {
                sink.emit(PruneEvent::BatchFailed {
                    batch,
                    error: error.to_string(),
                });
                BatchOutcome::Failed { error }
            }
        }
    }
}
