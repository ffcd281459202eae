//! KPI cache store: last known value and fetch time per dataset key.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::dataset::{DatasetKey, DatasetValue, Key, KpiDataset, StoredDataset};
use super::storage::{SnapshotStorage, StoreSnapshot};

/// Keyed cache of KPI datasets, persisted as one snapshot.
///
/// Every write replaces a whole [`StoredDataset`] under the state lock, so a
/// reader sees either the old record or the new one, never a value paired with
/// the wrong timestamp. Persisted state is only for painting something on
/// startup: callers must still run it through the freshness policy.
pub struct KpiStore {
  state: RwLock<BTreeMap<DatasetKey, StoredDataset>>,
  storage: Box<dyn SnapshotStorage>,
  /// Serializes saves so the last save always carries the latest state.
  persist_lock: Mutex<()>,
}

impl KpiStore {
  /// Store with nothing persisted.
  pub fn in_memory() -> Self {
    Self::from_state(BTreeMap::new(), Box::new(super::storage::NoopStorage))
  }

  /// Create a store backed by `storage`, restoring whatever it holds.
  ///
  /// An unreadable snapshot is logged and ignored; the store starts empty.
  pub fn open(storage: impl SnapshotStorage + 'static) -> Self {
    let state = match storage.load() {
      Ok(Some(snapshot)) => restore(snapshot),
      Ok(None) => BTreeMap::new(),
      Err(e) => {
        warn!(error = %e, "Discarding unreadable KPI snapshot");
        BTreeMap::new()
      }
    };

    Self::from_state(state, Box::new(storage))
  }

  fn from_state(
    state: BTreeMap<DatasetKey, StoredDataset>,
    storage: Box<dyn SnapshotStorage>,
  ) -> Self {
    Self {
      state: RwLock::new(state),
      storage,
      persist_lock: Mutex::new(()),
    }
  }

  /// Read the cached record for `key`.
  ///
  /// A persisted value that no longer matches `T` reads back as empty.
  pub fn get<T: DatasetValue>(&self, key: &Key<T>) -> KpiDataset<T> {
    let stored = match self.state.read() {
      Ok(state) => state.get(&key.id()).cloned(),
      Err(e) => {
        warn!(error = %e, "KPI store lock poisoned");
        None
      }
    };

    let Some(stored) = stored else {
      return KpiDataset::empty();
    };

    match serde_json::from_value::<T>(stored.value) {
      Ok(value) => KpiDataset {
        value: Some(value),
        last_fetched_at_millis: Some(stored.last_fetched_at_millis),
      },
      Err(e) => {
        warn!(dataset = %key.id(), error = %e, "Cached dataset has an unexpected shape");
        KpiDataset::empty()
      }
    }
  }

  /// Untyped record for `key`, for callers that only display it.
  pub fn raw(&self, key: DatasetKey) -> Option<StoredDataset> {
    self
      .state
      .read()
      .ok()
      .and_then(|state| state.get(&key).cloned())
  }

  /// Replace the value for `key`, stamped with the current wall-clock time.
  pub fn set<T: DatasetValue>(&self, key: &Key<T>, value: T) -> Result<()> {
    let value = serde_json::to_value(value)
      .map_err(|e| eyre!("Failed to serialize dataset {}: {}", key.id(), e))?;
    let record = StoredDataset {
      value,
      last_fetched_at_millis: Utc::now().timestamp_millis(),
    };

    {
      let mut state = self
        .state
        .write()
        .map_err(|e| eyre!("Lock poisoned: {}", e))?;
      state.insert(key.id(), record);
    }

    debug!(dataset = %key.id(), "Cached dataset updated");
    self.persist();
    Ok(())
  }

  /// Reset `key` to empty.
  pub fn clear<T>(&self, key: &Key<T>) -> Result<()> {
    self.clear_key(key.id())
  }

  /// Reset a key without knowing its value type.
  pub fn clear_key(&self, key: DatasetKey) -> Result<()> {
    {
      let mut state = self
        .state
        .write()
        .map_err(|e| eyre!("Lock poisoned: {}", e))?;
      state.remove(&key);
    }

    debug!(dataset = %key, "Cached dataset cleared");
    self.persist();
    Ok(())
  }

  /// Reset every key.
  pub fn clear_all(&self) -> Result<()> {
    {
      let mut state = self
        .state
        .write()
        .map_err(|e| eyre!("Lock poisoned: {}", e))?;
      state.clear();
    }

    self.persist();
    Ok(())
  }

  /// Keys that currently hold a value.
  pub fn cached_keys(&self) -> Vec<DatasetKey> {
    self
      .state
      .read()
      .map(|state| state.keys().copied().collect())
      .unwrap_or_default()
  }

  /// Serializable copy of the whole store.
  pub fn snapshot(&self) -> StoreSnapshot {
    let mut snapshot = StoreSnapshot::new();
    if let Ok(state) = self.state.read() {
      snapshot.datasets = state
        .iter()
        .map(|(key, record)| (key.storage_name(), record.clone()))
        .collect();
    }
    snapshot
  }

  /// Save the current state. Failures are logged, never surfaced.
  fn persist(&self) {
    let _guard = match self.persist_lock.lock() {
      Ok(guard) => guard,
      Err(e) => {
        warn!(error = %e, "KPI persist lock poisoned");
        return;
      }
    };

    if let Err(e) = self.storage.save(&self.snapshot()) {
      warn!(error = %e, "Failed to persist KPI snapshot");
    }
  }
}

impl Default for KpiStore {
  fn default() -> Self {
    Self::in_memory()
  }
}

fn restore(snapshot: StoreSnapshot) -> BTreeMap<DatasetKey, StoredDataset> {
  snapshot
    .datasets
    .into_iter()
    .filter_map(|(name, record)| match DatasetKey::parse(&name) {
      Some(key) => Some((key, record)),
      None => {
        debug!(dataset = %name, "Dropping unknown dataset from snapshot");
        None
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStorage;
  use std::sync::Arc;

  const REASONS: Key<Vec<String>> = Key::new(DatasetKey::Reasons);
  const NEW_LEADS: Key<Vec<u32>> = Key::new(DatasetKey::NewLeads);

  #[test]
  fn test_get_missing_is_empty() {
    let store = KpiStore::in_memory();
    assert_eq!(store.get(&REASONS), KpiDataset::empty());
  }

  #[test]
  fn test_set_then_get_stamps_time() {
    let store = KpiStore::in_memory();
    let before = Utc::now().timestamp_millis();

    store.set(&REASONS, vec!["Price".to_string()]).unwrap();

    let dataset = store.get(&REASONS);
    assert_eq!(dataset.value, Some(vec!["Price".to_string()]));
    assert!(dataset.last_fetched_at_millis.unwrap() >= before);
  }

  #[test]
  fn test_clear_resets_both_fields() {
    let store = KpiStore::in_memory();
    store.set(&REASONS, vec!["Price".to_string()]).unwrap();

    store.clear(&REASONS).unwrap();

    let dataset = store.get(&REASONS);
    assert_eq!(dataset.value, None);
    assert_eq!(dataset.last_fetched_at_millis, None);
  }

  #[test]
  fn test_keys_are_independent() {
    let store = KpiStore::in_memory();
    store.set(&REASONS, vec!["Price".to_string()]).unwrap();
    store.set(&NEW_LEADS, vec![1, 2, 3]).unwrap();

    store.clear(&NEW_LEADS).unwrap();

    assert!(store.get(&NEW_LEADS).is_empty());
    assert_eq!(store.get(&REASONS).value, Some(vec!["Price".to_string()]));
  }

  #[test]
  fn test_per_salesman_keys_are_independent() {
    let store = KpiStore::in_memory();
    let first: Key<u32> = Key::new(DatasetKey::SalesmanSuccessRate { salesman_id: 1 });
    let second: Key<u32> = Key::new(DatasetKey::SalesmanSuccessRate { salesman_id: 2 });

    store.set(&first, 10).unwrap();

    assert_eq!(store.get(&first).value, Some(10));
    assert!(store.get(&second).is_empty());
  }

  #[test]
  fn test_snapshot_survives_reopen() {
    let storage = Arc::new(MemoryStorage::new());

    let store = KpiStore::open(Arc::clone(&storage));
    store.set(&REASONS, vec!["Integrations".to_string()]).unwrap();
    let fetched_at = store.get(&REASONS).last_fetched_at_millis;
    drop(store);

    let reopened = KpiStore::open(Arc::clone(&storage));
    let dataset = reopened.get(&REASONS);
    assert_eq!(dataset.value, Some(vec!["Integrations".to_string()]));
    assert_eq!(dataset.last_fetched_at_millis, fetched_at);
  }

  #[test]
  fn test_clear_is_persisted() {
    let storage = Arc::new(MemoryStorage::new());

    let store = KpiStore::open(Arc::clone(&storage));
    store.set(&REASONS, vec!["Price".to_string()]).unwrap();
    store.clear(&REASONS).unwrap();

    let reopened = KpiStore::open(Arc::clone(&storage));
    assert!(reopened.get(&REASONS).is_empty());
  }

  #[test]
  fn test_mismatched_type_reads_empty() {
    let store = KpiStore::in_memory();
    store.set(&REASONS, vec!["Price".to_string()]).unwrap();

    let wrong: Key<Vec<u32>> = Key::new(DatasetKey::Reasons);
    assert!(store.get(&wrong).is_empty());
    assert_eq!(
      store.raw(DatasetKey::Reasons).map(|r| r.value),
      Some(serde_json::json!(["Price"]))
    );
  }

  #[test]
  fn test_unknown_snapshot_entries_are_dropped() {
    let storage = Arc::new(MemoryStorage::new());
    let mut snapshot = StoreSnapshot::new();
    snapshot.datasets.insert(
      "legacy-chart".to_string(),
      StoredDataset {
        value: serde_json::json!(1),
        last_fetched_at_millis: 5,
      },
    );
    storage.save(&snapshot).unwrap();

    let store = KpiStore::open(Arc::clone(&storage));
    assert!(store.cached_keys().is_empty());
  }

  #[test]
  fn test_clear_all() {
    let store = KpiStore::in_memory();
    store.set(&REASONS, vec!["Price".to_string()]).unwrap();
    store.set(&NEW_LEADS, vec![1]).unwrap();

    store.clear_all().unwrap();

    assert!(store.cached_keys().is_empty());
    assert!(store.snapshot().datasets.is_empty());
  }

  #[test]
  fn test_concurrent_writers_leave_consistent_records() {
    let store = Arc::new(KpiStore::in_memory());
    let handles: Vec<_> = (0..8u32)
      .map(|i| {
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
          for _ in 0..50 {
            store.set(&NEW_LEADS, vec![i]).unwrap();
            let dataset = store.get(&NEW_LEADS);
            assert_eq!(
              dataset.value.is_some(),
              dataset.last_fetched_at_millis.is_some()
            );
          }
        })
      })
      .collect();

    for handle in handles {
      handle.join().unwrap();
    }

    let value = store.get(&NEW_LEADS).value.unwrap();
    assert_eq!(value.len(), 1);
    assert!(value[0] < 8);
  }
}
