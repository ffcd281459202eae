//! Dataset keys and the cached record kept per key.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Identifies one independently cached KPI payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKey {
  SectionCards,
  ChartArea,
  ClientMeetings,
  NewLeads,
  Reasons,
  LeadsSource,
  CommercialSectors,
  LeadsSourceSuccessRate,
  CommercialSectorSuccessRate,
  Salesmen,
  SalesmanPerformance,
  SalesmanSuccessRate { salesman_id: u64 },
}

impl DatasetKey {
  /// Every key that does not carry a parameter.
  pub const FIXED: [DatasetKey; 11] = [
    DatasetKey::SectionCards,
    DatasetKey::ChartArea,
    DatasetKey::ClientMeetings,
    DatasetKey::NewLeads,
    DatasetKey::Reasons,
    DatasetKey::LeadsSource,
    DatasetKey::CommercialSectors,
    DatasetKey::LeadsSourceSuccessRate,
    DatasetKey::CommercialSectorSuccessRate,
    DatasetKey::Salesmen,
    DatasetKey::SalesmanPerformance,
  ];

  /// Name used inside the persisted snapshot.
  pub fn storage_name(&self) -> String {
    match self {
      Self::SectionCards => "section-cards".to_string(),
      Self::ChartArea => "chart-area".to_string(),
      Self::ClientMeetings => "client-meetings".to_string(),
      Self::NewLeads => "new-leads".to_string(),
      Self::Reasons => "reasons".to_string(),
      Self::LeadsSource => "leads-source".to_string(),
      Self::CommercialSectors => "commercial-sectors".to_string(),
      Self::LeadsSourceSuccessRate => "leads-source-success-rate".to_string(),
      Self::CommercialSectorSuccessRate => "commercial-sector-success-rate".to_string(),
      Self::Salesmen => "salesmen".to_string(),
      Self::SalesmanPerformance => "salesman-performance".to_string(),
      Self::SalesmanSuccessRate { salesman_id } => {
        format!("salesman-success-rate:{}", salesman_id)
      }
    }
  }

  /// Parse a storage name back into a key.
  pub fn parse(name: &str) -> Option<Self> {
    if let Some(id) = name.strip_prefix("salesman-success-rate:") {
      return id
        .parse()
        .ok()
        .map(|salesman_id| Self::SalesmanSuccessRate { salesman_id });
    }
    Self::FIXED
      .iter()
      .copied()
      .find(|key| key.storage_name() == name)
  }
}

impl fmt::Display for DatasetKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.storage_name())
  }
}

/// A dataset key bound to the type of value cached under it.
pub struct Key<T> {
  id: DatasetKey,
  _value: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
  pub const fn new(id: DatasetKey) -> Self {
    Self {
      id,
      _value: PhantomData,
    }
  }

  pub fn id(&self) -> DatasetKey {
    self.id
  }
}

impl<T> Clone for Key<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Key").field(&self.id).finish()
  }
}

/// Value types that may be stored in the KPI cache.
pub trait DatasetValue: Clone + Send + Sync + Serialize + DeserializeOwned {}

impl<T> DatasetValue for T where T: Clone + Send + Sync + Serialize + DeserializeOwned {}

/// Last known value of a dataset and when it was fetched.
///
/// Both fields are `Some` or both are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiDataset<T> {
  pub value: Option<T>,
  pub last_fetched_at_millis: Option<i64>,
}

impl<T> KpiDataset<T> {
  pub fn empty() -> Self {
    Self {
      value: None,
      last_fetched_at_millis: None,
    }
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.value.is_none()
  }
}

impl<T> Default for KpiDataset<T> {
  fn default() -> Self {
    Self::empty()
  }
}

/// Untyped record as held by the store and persisted in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDataset {
  pub value: serde_json::Value,
  pub last_fetched_at_millis: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_storage_names_round_trip() {
    for key in DatasetKey::FIXED {
      assert_eq!(DatasetKey::parse(&key.storage_name()), Some(key));
    }
    let per_salesman = DatasetKey::SalesmanSuccessRate { salesman_id: 42 };
    assert_eq!(per_salesman.storage_name(), "salesman-success-rate:42");
    assert_eq!(DatasetKey::parse("salesman-success-rate:42"), Some(per_salesman));
  }

  #[test]
  fn test_parse_rejects_unknown_names() {
    assert_eq!(DatasetKey::parse("kpi"), None);
    assert_eq!(DatasetKey::parse("salesman-success-rate:abc"), None);
  }

  #[test]
  fn test_empty_dataset_has_no_timestamp() {
    let dataset: KpiDataset<u32> = KpiDataset::empty();
    assert!(dataset.is_empty());
    assert_eq!(dataset.last_fetched_at_millis, None);
  }
}
