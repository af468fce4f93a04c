//! Randomized checks of the retention invariants
//!
//! Every run is seeded so failures reproduce.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use retention::batch::batches;
use retention::collector::{collect, Collected};
use retention::{Granularity, InMemoryStore, NullSink, ObjectRecord, RetentionPlan};
use std::collections::{HashMap, HashSet};

const SEEDS: [u64; 6] = [1, 7, 42, 1337, 2024, 0xdead_beef];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

/// Up to 600 objects spread over the ten years before `now()`
fn random_store(rng: &mut ChaCha8Rng) -> InMemoryStore {
    let store = InMemoryStore::with_page_size(rng.gen_range(1..=250));
    let count = rng.gen_range(0..600);
    let span = 10 * 365 * 24 * 3600;
    for i in 0..count {
        let age = TimeDelta::seconds(rng.gen_range(0..span));
        store.insert(format!("backups/{i:04}.tar.zst"), now() - age);
    }
    store
}

fn collect_now(store: &InMemoryStore) -> Collected {
    block_on(collect(store, "bucket", "backups/", &mut NullSink))
        .expect("in-memory listing succeeds")
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn key_set<'a>(records: impl IntoIterator<Item = &'a ObjectRecord>) -> HashSet<&'a str> {
    records.into_iter().map(ObjectRecord::key).collect()
}

#[test]
fn test_candidates_and_keeps_partition_actionable() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let collected = collect_now(&random_store(&mut rng));
        let retention_days = rng.gen_range(0..120);
        let plan = RetentionPlan::new(&collected.set, now(), retention_days, Some(365));

        let candidates = key_set(plan.candidates().iter().copied());
        let kept = key_set(
            plan.reduction
                .year_keeps
                .iter()
                .chain(&plan.reduction.week_keeps)
                .map(|keep| keep.record),
        );

        assert!(candidates.is_disjoint(&kept), "seed {seed}");
        let union: HashSet<_> = candidates.union(&kept).copied().collect();
        assert_eq!(union, key_set(plan.actionable), "seed {seed}");
        assert_eq!(
            candidates.len() + plan.reduction.kept(),
            plan.actionable.len(),
            "seed {seed}"
        );
    }
}

#[test]
fn test_nothing_newer_than_cutoff_is_a_candidate() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let collected = collect_now(&random_store(&mut rng));
        let plan = RetentionPlan::new(&collected.set, now(), 30, None);

        assert!(plan
            .candidates()
            .iter()
            .all(|record| record.last_modified() < plan.cutoff));
        let retained = plan.retained().count();
        assert_eq!(retained + plan.candidates().len(), collected.set.len());
    }
}

#[test]
fn test_every_bucket_keeps_exactly_its_newest() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let collected = collect_now(&random_store(&mut rng));
        let plan = RetentionPlan::new(&collected.set, now(), 30, Some(365));
        let window = plan.weekly_since.expect("bounded window");

        for (granularity, keeps, population) in [
            (
                Granularity::Year,
                &plan.reduction.year_keeps,
                plan.actionable.iter().collect::<Vec<_>>(),
            ),
            (
                Granularity::Week,
                &plan.reduction.week_keeps,
                plan.actionable
                    .iter()
                    .filter(|r| r.last_modified() >= window)
                    .collect(),
            ),
        ] {
            let mut newest: HashMap<_, DateTime<Utc>> = HashMap::new();
            for record in &population {
                let entry = newest
                    .entry(granularity.bucket(record.last_modified()))
                    .or_insert(record.last_modified());
                *entry = (*entry).max(record.last_modified());
            }

            assert_eq!(keeps.len(), newest.len(), "seed {seed} {granularity}");
            for keep in keeps.iter() {
                assert_eq!(
                    Some(&keep.record.last_modified()),
                    newest.get(&keep.bucket),
                    "seed {seed} {granularity} {}",
                    keep.bucket
                );
            }
        }
    }
}

#[test]
fn test_pruning_again_finds_nothing() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let store = random_store(&mut rng);
        let collected = collect_now(&store);
        let plan = RetentionPlan::new(&collected.set, now(), 30, Some(365));

        let survivors = InMemoryStore::new();
        for record in plan.retained() {
            survivors.insert(record.key(), record.last_modified());
        }
        let second = collect_now(&survivors);
        let replan = RetentionPlan::new(&second.set, now(), 30, Some(365));

        assert!(replan.candidates().is_empty(), "seed {seed}");
    }
}

#[test]
fn test_adding_a_newer_object_never_saves_a_candidate() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let store = random_store(&mut rng);
        let before = collect_now(&store);
        let plan = RetentionPlan::new(&before.set, now(), 30, Some(365));
        let old_candidates: HashSet<String> = plan
            .candidates()
            .iter()
            .map(|r| r.key().to_string())
            .collect();

        let newest = before.set.newest().map(ObjectRecord::last_modified);
        let extra = newest.unwrap_or_else(now) + TimeDelta::seconds(1);
        store.insert("backups/zz-extra.tar.zst", extra);
        let after = collect_now(&store);
        let replan = RetentionPlan::new(&after.set, now(), 30, Some(365));
        let new_candidates: HashSet<&str> = key_set(replan.candidates().iter().copied());

        for key in &old_candidates {
            assert!(new_candidates.contains(key.as_str()), "seed {seed} {key}");
        }
    }
}

#[test]
fn test_batches_cover_candidates_in_order() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let collected = collect_now(&random_store(&mut rng));
        let plan = RetentionPlan::new(&collected.set, now(), 0, Some(0));
        let size = rng.gen_range(1..=1000);

        let chunks: Vec<_> = batches(plan.candidates(), size).collect();
        assert!(chunks.iter().all(|chunk| !chunk.is_empty() && chunk.len() <= size));
        if let Some((last, full)) = chunks.split_last() {
            assert!(full.iter().all(|chunk| chunk.len() == size));
            assert!(last.len() <= size);
        }
        let flattened: Vec<&str> = chunks
            .iter()
            .flat_map(|chunk| chunk.iter().map(|r| r.key()))
            .collect();
        let expected: Vec<&str> = plan.candidates().iter().map(|r| r.key()).collect();
        assert_eq!(flattened, expected, "seed {seed}");
    }
}
