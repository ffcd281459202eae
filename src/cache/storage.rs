//! Snapshot storage trait and SQLite implementation.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use super::dataset::StoredDataset;

/// Fixed key the whole KPI store snapshot is persisted under.
pub const STORAGE_KEY: &str = "kpi-storage";

const SNAPSHOT_VERSION: u32 = 1;

/// Serialized form of the whole KPI store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
  #[serde(default)]
  pub version: u32,
  /// Keyed by `DatasetKey::storage_name`.
  #[serde(default)]
  pub datasets: BTreeMap<String, StoredDataset>,
}

impl StoreSnapshot {
  pub fn new() -> Self {
    Self {
      version: SNAPSHOT_VERSION,
      datasets: BTreeMap::new(),
    }
  }
}

/// Trait for snapshot persistence backends.
pub trait SnapshotStorage: Send + Sync {
  /// Load the last saved snapshot, if any.
  fn load(&self) -> Result<Option<StoreSnapshot>>;

  /// Replace the saved snapshot.
  fn save(&self, snapshot: &StoreSnapshot) -> Result<()>;
}

/// Storage implementation that doesn't persist anything.
/// Used when caching is disabled - every load misses.
pub struct NoopStorage;

impl SnapshotStorage for NoopStorage {
  fn load(&self) -> Result<Option<StoreSnapshot>> {
    Ok(None) // Always miss
  }

  fn save(&self, _snapshot: &StoreSnapshot) -> Result<()> {
    Ok(()) // Discard
  }
}

/// In-process storage holding the serialized blob. Survives store re-creation
/// within the same process, which is enough to simulate a restart.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
  blob: Mutex<Option<Vec<u8>>>,
}

#[cfg(test)]
impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

#[cfg(test)]
impl SnapshotStorage for MemoryStorage {
  fn load(&self) -> Result<Option<StoreSnapshot>> {
    let blob = self
      .blob
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    match blob.as_deref() {
      Some(data) => {
        let snapshot = serde_json::from_slice(data)
          .map_err(|e| eyre!("Failed to deserialize snapshot: {}", e))?;
        Ok(Some(snapshot))
      }
      None => Ok(None),
    }
  }

  fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
    let data =
      serde_json::to_vec(snapshot).map_err(|e| eyre!("Failed to serialize snapshot: {}", e))?;
    let mut blob = self
      .blob
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    *blob = Some(data);
    Ok(())
  }
}

impl<S: SnapshotStorage + ?Sized> SnapshotStorage for std::sync::Arc<S> {
  fn load(&self) -> Result<Option<StoreSnapshot>> {
    (**self).load()
  }

  fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
    (**self).save(snapshot)
  }
}

/// SQLite-based snapshot storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open or create the storage database at `path`.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// In-memory database, gone when dropped.
  #[cfg(test)]
  pub fn in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Run database migrations for the snapshot table.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the snapshot table.
const CACHE_SCHEMA: &str = r#"
-- One serialized blob per storage key
CREATE TABLE IF NOT EXISTS kv_store (
    storage_key TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SnapshotStorage for SqliteStorage {
  fn load(&self) -> Result<Option<StoreSnapshot>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data: Option<Vec<u8>> = conn
      .query_row(
        "SELECT data FROM kv_store WHERE storage_key = ?",
        params![STORAGE_KEY],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read snapshot: {}", e))?;

    match data {
      Some(data) => {
        let snapshot = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize snapshot: {}", e))?;
        Ok(Some(snapshot))
      }
      None => Ok(None),
    }
  }

  fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
    let data =
      serde_json::to_vec(snapshot).map_err(|e| eyre!("Failed to serialize snapshot: {}", e))?;

    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO kv_store (storage_key, data, saved_at)
         VALUES (?, ?, datetime('now'))",
        params![STORAGE_KEY, data],
      )
      .map_err(|e| eyre!("Failed to store snapshot: {}", e))?;

    Ok(())
  }
}
