//! Bucket reduction: keep the newest object per ISO year and per ISO week
//!
//! Both passes work on a slice sorted by `last_modified`. Bucket keys are
//! monotone in time, so every bucket is one contiguous run and its last
//! element is its newest.

use crate::object::ObjectRecord;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::fmt;

/// Width of a retention bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Week,
}

impl Granularity {
    /// Bucket containing `at`
    ///
    /// Uses the ISO week-based year for both granularities, so a week never
    /// straddles two year buckets.
    pub fn bucket(self, at: DateTime<Utc>) -> BucketKey {
        let iso = at.iso_week();
        match self {
            Granularity::Year => BucketKey::Year(iso.year()),
            Granularity::Week => BucketKey::Week {
                year: iso.year(),
                week: iso.week(),
            },
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Year => f.write_str("year"),
            Granularity::Week => f.write_str("week"),
        }
    }
}

/// Identity of one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum BucketKey {
    Year(i32),
    Week { year: i32, week: u32 },
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Year(year) => write!(f, "{year}"),
            BucketKey::Week { year, week } => write!(f, "{year}-W{week:02}"),
        }
    }
}

/// The survivor picked for one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKeep<'a> {
    pub bucket: BucketKey,
    /// Position of the survivor in the slice it was picked from
    pub index: usize,
    pub record: &'a ObjectRecord,
    /// Number of objects in the bucket, survivor included
    pub bucket_size: usize,
}

/// Pick the newest record of every bucket in a sorted slice
pub fn keep_latest(records: &[ObjectRecord], granularity: Granularity) -> Vec<BucketKeep<'_>> {
    debug_assert!(records
        .windows(2)
        .all(|pair| pair[0].last_modified() <= pair[1].last_modified()));

    let mut keeps = Vec::new();
    let mut offset = 0;
    for run in records.chunk_by(|a, b| {
        granularity.bucket(a.last_modified()) == granularity.bucket(b.last_modified())
    }) {
        let index = offset + run.len() - 1;
        let record = &records[index];
        keeps.push(BucketKeep {
            bucket: granularity.bucket(record.last_modified()),
            index,
            record,
            bucket_size: run.len(),
        });
        offset += run.len();
    }
    keeps
}

/// Outcome of both reduction passes over the age-filtered objects
#[derive(Debug, Clone, Default)]
pub struct Reduction<'a> {
    /// One survivor per ISO year over all age-filtered objects
    pub year_keeps: Vec<BucketKeep<'a>>,
    /// One survivor per ISO week inside the weekly window.
    /// Indices refer to the age-filtered slice.
    pub week_keeps: Vec<BucketKeep<'a>>,
    /// Survivors picked by both passes
    pub kept_by_both: usize,
    /// Deletion candidates, oldest first
    pub candidates: Vec<&'a ObjectRecord>,
    kept: Vec<bool>,
}

impl<'a> Reduction<'a> {
    /// Number of distinct objects kept by either pass
    pub fn kept(&self) -> usize {
        self.year_keeps.len() + self.week_keeps.len() - self.kept_by_both
    }

    /// Whether the record at `index` of the age-filtered slice survives
    pub fn is_kept(&self, index: usize) -> bool {
        self.kept.get(index).copied().unwrap_or(false)
    }
}

/// Run the year pass over `actionable` and the week pass over its tail
/// starting at `weekly_start`
///
/// `actionable` must be sorted ascending. Both keep sets are computed against
/// the age-filtered population; candidates are whatever neither pass keeps.
pub fn reduce(actionable: &[ObjectRecord], weekly_start: usize) -> Reduction<'_> {
    let weekly_start = weekly_start.min(actionable.len());

    let year_keeps = keep_latest(actionable, Granularity::Year);
    let week_keeps: Vec<_> = keep_latest(&actionable[weekly_start..], Granularity::Week)
        .into_iter()
        .map(|keep| BucketKeep {
            index: keep.index + weekly_start,
            ..keep
        })
        .collect();

    let mut kept = vec![false; actionable.len()];
    for keep in &year_keeps {
        kept[keep.index] = true;
    }
    let mut kept_by_both = 0;
    for keep in &week_keeps {
        if kept[keep.index] {
            kept_by_both += 1;
        }
        kept[keep.index] = true;
    }

    let candidates = actionable
        .iter()
        .zip(&kept)
        .filter(|(_, kept)| !**kept)
        .map(|(record, _)| record)
        .collect();

    Reduction {
        year_keeps,
        week_keeps,
        kept_by_both,
        candidates,
        kept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::testutil::*;
    use chrono::TimeDelta;

    fn keys<'a>(records: impl IntoIterator<Item = &'a ObjectRecord>) -> Vec<&'a str> {
        records.into_iter().map(ObjectRecord::key).collect()
    }

    #[test]
    fn test_bucket_keys() {
        // 2023-01-01 is a Sunday: ISO week 52 of 2022
        assert_eq!(
            Granularity::Week.bucket(day(2023, 1, 1)),
            BucketKey::Week { year: 2022, week: 52 }
        );
        assert_eq!(Granularity::Year.bucket(day(2023, 1, 1)), BucketKey::Year(2022));
        assert_eq!(Granularity::Year.bucket(day(2023, 1, 2)), BucketKey::Year(2023));
        assert_eq!(Granularity::Week.bucket(day(2023, 1, 20)).to_string(), "2023-W03");
        assert_eq!(Granularity::Year.bucket(day(2021, 6, 1)).to_string(), "2021");
    }

    #[test]
    fn test_keep_latest_per_year() {
        let set = set(&[
            ("2021-a", day(2021, 2, 1)),
            ("2021-b", day(2021, 11, 1)),
            ("2022-a", day(2022, 3, 1)),
            ("2023-a", day(2023, 4, 1)),
            ("2023-b", day(2023, 5, 1)),
            ("2023-c", day(2023, 6, 1)),
        ]);

        let keeps = keep_latest(set.as_slice(), Granularity::Year);
        assert_eq!(keys(keeps.iter().map(|k| k.record)), vec!["2021-b", "2022-a", "2023-c"]);
        assert_eq!(
            keeps.iter().map(|k| k.bucket_size).collect::<Vec<_>>(),
            vec![2, 1, 3]
        );
        assert_eq!(keeps[2].index, 5);
    }

    #[test]
    fn test_same_week_number_in_different_years_not_merged() {
        // Both in ISO week 2, one year apart, adjacent after sorting
        let set = set(&[("2022-w02", day(2022, 1, 12)), ("2023-w02", day(2023, 1, 11))]);

        let keeps = keep_latest(set.as_slice(), Granularity::Week);
        assert_eq!(keeps.len(), 2);
    }

    #[test]
    fn test_singleton_bucket_keeps_its_element() {
        let set = set(&[("only", day(2020, 5, 5))]);
        let reduction = reduce(set.as_slice(), 0);

        assert_eq!(reduction.year_keeps.len(), 1);
        assert_eq!(reduction.week_keeps.len(), 1);
        assert_eq!(reduction.kept_by_both, 1);
        assert_eq!(reduction.kept(), 1);
        assert!(reduction.candidates.is_empty());
    }

    #[test]
    fn test_week_pass_thins_to_one_per_week() {
        // Daily backups over two full ISO weeks (Mon 2023-03-06 .. Sun 2023-03-19)
        let start = day(2023, 3, 6);
        let entries: Vec<(String, _)> = (0..14)
            .map(|i| (format!("day-{i:02}"), start + TimeDelta::days(i)))
            .collect();
        let refs: Vec<_> = entries.iter().map(|(k, t)| (k.as_str(), *t)).collect();
        let set = set(&refs);

        let reduction = reduce(set.as_slice(), 0);

        assert_eq!(keys(reduction.week_keeps.iter().map(|k| k.record)), vec!["day-06", "day-13"]);
        assert_eq!(keys(reduction.year_keeps.iter().map(|k| k.record)), vec!["day-13"]);
        assert_eq!(reduction.kept_by_both, 1);
        assert_eq!(reduction.candidates.len(), 12);
        assert!(!keys(reduction.candidates.iter().copied()).contains(&"day-06"));
    }

    #[test]
    fn test_objects_before_weekly_window_only_keep_yearly() {
        let set = set(&[
            ("2022-jan", day(2022, 1, 10)),
            ("2022-jun", day(2022, 6, 15)),
            ("2023-jan-05", day(2023, 1, 5)),
            ("2023-jan-20", day(2023, 1, 20)),
        ]);

        // Weekly window starts at 2022-06-15
        let reduction = reduce(set.as_slice(), 1);

        assert_eq!(
            keys(reduction.year_keeps.iter().map(|k| k.record)),
            vec!["2022-jun", "2023-jan-20"]
        );
        assert_eq!(
            keys(reduction.week_keeps.iter().map(|k| k.record)),
            vec!["2022-jun", "2023-jan-05", "2023-jan-20"]
        );
        assert_eq!(reduction.week_keeps[0].index, 1);
        assert_eq!(keys(reduction.candidates.iter().copied()), vec!["2022-jan"]);
        assert_eq!(reduction.kept(), 3);
        assert!(reduction.is_kept(1));
        assert!(!reduction.is_kept(0));
    }

    #[test]
    fn test_unbounded_weeks_when_window_starts_at_zero() {
        let set = set(&[
            ("2022-jan", day(2022, 1, 10)),
            ("2022-jun", day(2022, 6, 15)),
        ]);

        let reduction = reduce(set.as_slice(), 0);
        assert!(reduction.candidates.is_empty());
    }

    #[test]
    fn test_empty_weekly_window() {
        let set = set(&[("a", day(2021, 1, 5)), ("b", day(2021, 1, 6))]);

        let reduction = reduce(set.as_slice(), set.len());
        assert!(reduction.week_keeps.is_empty());
        assert_eq!(keys(reduction.candidates.iter().copied()), vec!["a"]);
    }

    #[test]
    fn test_empty_input() {
        let reduction = reduce(&[], 0);
        assert!(reduction.year_keeps.is_empty());
        assert!(reduction.week_keeps.is_empty());
        assert!(reduction.candidates.is_empty());
    }
}
