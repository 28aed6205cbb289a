//! Visit deduplication and counter updates.
//!
//! - [`keys`]: hashed dedup keys per visitor, path and day
//! - [`cache`]: TTL caches holding those keys (SQLite-shared or in-process)
//! - [`counters`]: single-statement counter increments
//! - [`tracker`]: the per-request decision tying them together
//! - [`sweeper`]: background removal of expired keys

pub mod cache;
pub mod counters;
pub mod keys;
pub mod sweeper;
pub mod tracker;

pub use cache::{MemoryVisitCache, SqliteVisitCache, VisitCache};
pub use counters::{CounterDelta, CounterStore, IncrementOutcome};
pub use sweeper::spawn_purge_task;
pub use tracker::{CacheFailurePolicy, VisitOutcome, VisitSettings, VisitTracker};
