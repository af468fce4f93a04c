//! Tiered retention for object stores
//!
//! This crate provides:
//! - Object records and the sorted, read-only object set (Collector output)
//! - The age-based tier filter
//! - Yearly and weekly bucket reduction
//! - Batched, confirmable deletion
//! - Ports for the store, the operator prompt, the clock and diagnostics
//!
//! The pipeline is driven through [`Pruner::run`].

pub mod batch;
pub mod buckets;
pub mod clock;
pub mod collector;
pub mod config;
pub mod error;
pub mod events;
pub mod memory;
pub mod object;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod store;
pub mod tier;

// Re-exports
pub use batch::{BatchDeleter, BatchOutcome, SkipReason};
pub use buckets::{BucketKey, BucketKeep, Granularity, Reduction};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{PruneConfig, MAX_BATCH_SIZE};
pub use error::{ConfigError, PruneError, StoreError};
pub use events::{EventSink, NullSink, PruneEvent, RecordingSink, TracingSink};
pub use memory::InMemoryStore;
pub use object::{ObjectRecord, ObjectSet, DIRECTORY_SEPARATOR};
pub use pipeline::{Pruner, RetentionPlan};
pub use prompt::{is_affirmative, Answer, ConfirmRequest, Prompt, ScriptedPrompt, AFFIRMATIVE};
pub use report::{BatchReport, PruneReport};
pub use store::{DeleteResponse, KeyError, ListPage, ListedObject, ObjectStore};
