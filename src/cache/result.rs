//! Result type for cache-first lookups.

use serde::Serialize;

/// Data returned by a cache-first lookup, with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was fetched from the API, in epoch millis
  pub fetched_at_millis: Option<i64>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T, fetched_at_millis: Option<i64>) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      fetched_at_millis,
    }
  }

  /// Create a new cache result from data fetched earlier in this session.
  pub fn from_cache(data: T, fetched_at_millis: i64) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      fetched_at_millis: Some(fetched_at_millis),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheResult<U> {
    CacheResult {
      data: f(self.data),
      source: self.source,
      fetched_at_millis: self.fetched_at_millis,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
  /// Fetched from the API just now
  Network,
  /// Reused from the store, fetched earlier in this session
  Cache,
}
