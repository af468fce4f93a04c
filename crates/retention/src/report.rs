//! Summary of a pruning run

use crate::batch::BatchOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One processed batch
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// 1-based batch number
    pub batch: usize,
    pub keys: Vec<String>,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// What a run saw, decided and did
#[derive(Debug, Serialize)]
pub struct PruneReport {
    pub bucket: String,
    pub prefix: String,
    pub dry_run: bool,
    /// Reference instant of the run
    pub now: DateTime<Utc>,
    /// Objects at or after this instant were kept unconditionally
    pub cutoff: DateTime<Utc>,
    /// Start of the weekly tier, `None` when unbounded
    pub weekly_since: Option<DateTime<Utc>>,
    pub listed: usize,
    pub pages: usize,
    pub directory_markers: usize,
    pub undated: usize,
    pub actionable: usize,
    pub kept_yearly: usize,
    pub kept_weekly: usize,
    pub kept_by_both: usize,
    pub candidates: usize,
    pub batches: Vec<BatchReport>,
}

impl PruneReport {
    /// Objects the store confirmed as deleted
    pub fn deleted(&self) -> usize {
        self.batches.iter().map(|b| b.outcome.deleted()).sum()
    }

    pub fn dry_run_batches(&self) -> usize {
        self.count(|outcome| matches!(outcome, BatchOutcome::DryRun))
    }

    pub fn deleted_batches(&self) -> usize {
        self.count(|outcome| matches!(outcome, BatchOutcome::Deleted { .. }))
    }

    pub fn skipped_batches(&self) -> usize {
        self.count(|outcome| matches!(outcome, BatchOutcome::Skipped { .. }))
    }

    pub fn failed_batches(&self) -> usize {
        self.count(|outcome| matches!(outcome, BatchOutcome::Failed { .. }))
    }

    /// Some batch failed or some key could not be deleted
    pub fn has_failures(&self) -> bool {
        self.batches.iter().any(|b| b.outcome.has_failures())
    }

    /// Keys that would be (or were meant to be) deleted, in batch order
    pub fn candidate_keys(&self) -> impl Iterator<Item = &str> {
        self.batches
            .iter()
            .flat_map(|b| b.keys.iter().map(String::as_str))
    }

    fn count(&self, predicate: impl Fn(&BatchOutcome) -> bool) -> usize {
        self.batches.iter().filter(|b| predicate(&b.outcome)).count()
    }
}
