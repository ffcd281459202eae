//! Client-side KPI cache.
//!
//! This module provides:
//! - One cached record (value + fetch time) per dataset key
//! - Whole-snapshot persistence behind a pluggable storage trait
//! - A session-scoped freshness policy: fetch once per process, reuse after

mod dataset;
mod freshness;
mod result;
mod storage;
mod store;

pub use dataset::{DatasetKey, DatasetValue, Key};
pub use freshness::SessionEpoch;
pub use result::CacheResult;
pub use storage::SqliteStorage;
pub use store::KpiStore;

#[cfg(test)]
pub use result::CacheSource;
#[cfg(test)]
pub use storage::MemoryStorage;
