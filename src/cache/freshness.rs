//! Session-scoped freshness policy.
//!
//! Cached data is reused only if it was fetched during the current process
//! lifetime. There is no TTL: anything fetched before the session started
//! (restored from persisted storage) is refetched once, then reused.

use chrono::Utc;

/// Wall-clock instant the current process started, in epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEpoch(i64);

impl SessionEpoch {
  /// Capture the current wall-clock time. Call once at startup.
  pub fn now() -> Self {
    Self(Utc::now().timestamp_millis())
  }

  /// Epoch at a fixed instant.
  #[cfg(test)]
  pub fn from_millis(millis: i64) -> Self {
    Self(millis)
  }

  /// Check a cached timestamp against this session.
  pub fn is_stale(&self, last_fetched_at_millis: Option<i64>) -> bool {
    is_stale(last_fetched_at_millis, self.0)
  }
}

/// Whether a cached value must be refetched.
///
/// Returns `true` when nothing was ever fetched, or when the fetch happened at
/// or before the session epoch. A backwards clock jump across restarts can make
/// an old value look fresh; that is not corrected here.
pub fn is_stale(last_fetched_at_millis: Option<i64>, session_epoch_millis: i64) -> bool {
  match last_fetched_at_millis {
    None => true,
    Some(fetched_at) => fetched_at <= session_epoch_millis,
  }
}
