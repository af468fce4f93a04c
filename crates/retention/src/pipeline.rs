//! The pruning pipeline: collect, filter by age, reduce, delete in batches

use crate::batch::{batch_count, BatchDeleter};
use crate::buckets::{reduce, BucketKeep, Granularity, Reduction};
use crate::clock::Clock;
use crate::collector;
use crate::config::PruneConfig;
use crate::error::PruneError;
use crate::events::{EventSink, PruneEvent};
use crate::object::{ObjectRecord, ObjectSet};
use crate::prompt::Prompt;
use crate::report::PruneReport;
use crate::store::ObjectStore;
use crate::tier;
use chrono::{DateTime, Utc};

/// Which objects of a set survive and which are deletion candidates
#[derive(Debug, Clone)]
pub struct RetentionPlan<'a> {
    set: &'a ObjectSet,
    pub now: DateTime<Utc>,
    pub retention_days: u32,
    pub cutoff: DateTime<Utc>,
    pub weekly_since: Option<DateTime<Utc>>,
    /// Objects older than the cutoff
    pub actionable: &'a [ObjectRecord],
    pub reduction: Reduction<'a>,
}

impl<'a> RetentionPlan<'a> {
    /// Plan against `set` as of `now`
    ///
    /// `weekly_window_days` bounds the weekly tier to that many days before
    /// the cutoff; `None` makes it cover every actionable object.
    pub fn new(
        set: &'a ObjectSet,
        now: DateTime<Utc>,
        retention_days: u32,
        weekly_window_days: Option<u32>,
    ) -> Self {
        let cutoff = tier::days_before(now, retention_days);
        let weekly_since = weekly_window_days.map(|days| tier::days_before(cutoff, days));

        let actionable = tier::older_than(set, cutoff);
        let weekly_start = weekly_since
            .map(|since| tier::since(actionable, since).0)
            .unwrap_or(0);
        let reduction = reduce(actionable, weekly_start);

        Self {
            set,
            now,
            retention_days,
            cutoff,
            weekly_since,
            actionable,
            reduction,
        }
    }

    pub fn candidates(&self) -> &[&'a ObjectRecord] {
        &self.reduction.candidates
    }

    /// Objects that are not deletion candidates, oldest first
    pub fn retained(&self) -> impl Iterator<Item = &'a ObjectRecord> + '_ {
        let kept = self
            .actionable
            .iter()
            .enumerate()
            .filter(|(i, _)| self.reduction.is_kept(*i))
            .map(|(_, record)| record);
        kept.chain(&self.set.as_slice()[self.actionable.len()..])
    }

    /// Report the plan decision by decision
    pub fn emit(&self, batch_size: usize, sink: &mut dyn EventSink) {
        sink.emit(PruneEvent::Cutoff {
            cutoff: self.cutoff,
            retention_days: self.retention_days,
        });
        sink.emit(PruneEvent::WeeklyWindow {
            since: self.weekly_since,
        });
        sink.emit(PruneEvent::Actionable {
            count: self.actionable.len(),
        });

        emit_keeps(Granularity::Year, &self.reduction.year_keeps, sink);
        sink.emit(PruneEvent::Reduced {
            granularity: Granularity::Year,
            remaining: self.actionable.len() - self.reduction.year_keeps.len(),
        });
        emit_keeps(Granularity::Week, &self.reduction.week_keeps, sink);
        sink.emit(PruneEvent::Reduced {
            granularity: Granularity::Week,
            remaining: self.reduction.candidates.len(),
        });

        for record in self.retained() {
            sink.emit(PruneEvent::Retained {
                key: record.key().to_string(),
            });
        }
        sink.emit(PruneEvent::Planned {
            candidates: self.reduction.candidates.len(),
            batches: batch_count(self.reduction.candidates.len(), batch_size),
        });
    }
}

fn emit_keeps(granularity: Granularity, keeps: &[BucketKeep<'_>], sink: &mut dyn EventSink) {
    for keep in keeps {
        sink.emit(PruneEvent::Kept {
            granularity,
            bucket: keep.bucket,
            key: keep.record.key().to_string(),
            last_modified: keep.record.last_modified(),
            bucket_size: keep.bucket_size,
        });
    }
}

/// Entry point of the pipeline
///
/// Holds the ports; each [`Pruner::run`] is an independent invocation.
pub struct Pruner<'a> {
    store: &'a dyn ObjectStore,
    prompt: &'a dyn Prompt,
    clock: &'a dyn Clock,
}

impl<'a> Pruner<'a> {
    pub fn new(store: &'a dyn ObjectStore, prompt: &'a dyn Prompt, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            prompt,
            clock,
        }
    }

    /// Prune the bucket/prefix named in `config`
    ///
    /// Configuration and listing errors abort the run. Delete failures are
    /// recorded per batch in the returned report.
    pub async fn run(
        &self,
        config: &PruneConfig,
        sink: &mut dyn EventSink,
    ) -> Result<PruneReport, PruneError> {
        // 1. Nothing touches the store before the config is known to be valid
        config.validate()?;

        sink.emit(PruneEvent::Started {
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
            dry_run: config.dry_run,
            interactive: config.interactive,
        });
        if config.is_whole_bucket() {
            sink.emit(PruneEvent::WholeBucket {
                bucket: config.bucket.clone(),
            });
        }

        // 2. One reference instant for the whole run
        let now = self.clock.now();

        // 3. Drain the listing
        let collected =
            collector::collect(self.store, &config.bucket, &config.prefix, sink).await?;

        // 4. Decide what survives
        let plan = RetentionPlan::new(
            &collected.set,
            now,
            config.retention_days,
            config.weekly_window_days,
        );
        plan.emit(config.batch_size, sink);

        // 5. Delete batch by batch
        let deleter = BatchDeleter::new(self.store, self.prompt, config);
        let batches = deleter.run(plan.candidates(), sink).await;

        let report = PruneReport {
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
            dry_run: config.dry_run,
            now,
            cutoff: plan.cutoff,
            weekly_since: plan.weekly_since,
            listed: collected.set.len(),
            pages: collected.pages,
            directory_markers: collected.directory_markers,
            undated: collected.undated,
            actionable: plan.actionable.len(),
            kept_yearly: plan.reduction.year_keeps.len(),
            kept_weekly: plan.reduction.week_keeps.len(),
            kept_by_both: plan.reduction.kept_by_both,
            candidates: plan.candidates().len(),
            batches,
        };

        sink.emit(PruneEvent::Finished {
            deleted: report.deleted(),
            skipped_batches: report.skipped_batches(),
            failed_batches: report.failed_batches(),
        });

        Ok(report)
    }
}
