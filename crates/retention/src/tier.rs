//! Age-based tier filter

use crate::object::{ObjectRecord, ObjectSet};
use chrono::{DateTime, TimeDelta, Utc};

/// `now - days`, clamped to the earliest representable instant
pub fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(TimeDelta::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Objects strictly older than `cutoff`
///
/// The set is sorted, so the result is the leading run of records and is
/// returned as a view into the set.
pub fn older_than(set: &ObjectSet, cutoff: DateTime<Utc>) -> &[ObjectRecord] {
    let records = set.as_slice();
    let end = records.partition_point(|record| record.last_modified() < cutoff);
    &records[..end]
}

/// Suffix of a sorted slice modified at or after `since`
pub(crate) fn since(records: &[ObjectRecord], since: DateTime<Utc>) -> (usize, &[ObjectRecord]) {
    let start = records.partition_point(|record| record.last_modified() < since);
    (start, &records[start..])
}
