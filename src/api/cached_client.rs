//! Dashboard client that serves datasets from the KPI store when fresh.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheResult, DatasetKey, DatasetValue, Key, KpiStore, SessionEpoch};

use super::cache as keys;
use super::error::RequestError;
use super::services::DashboardApi;
use super::types::{
  ChartAreaPoint, ClientClassification, ClientMeeting, CommercialSectorCount,
  CommercialSectorSuccessRate, CreateClientMeeting, LeadSourceSuccessRate, LeadsSource, NewLeads,
  Reason, Salesman, SalesmanPerformance, SalesmanSuccessRate, SectionCards, UploadOutcome,
};

/// Dashboard API client with session-scoped caching.
///
/// Each dataset is fetched at most once per process: a value fetched after
/// the session epoch is reused, anything older (or missing) is refetched and
/// written back to the store. A failed fetch leaves the cached value alone.
#[derive(Clone)]
pub struct CachedDashboardClient {
  api: DashboardApi,
  store: Arc<KpiStore>,
  epoch: SessionEpoch,
}

impl CachedDashboardClient {
  pub fn new(api: DashboardApi, store: Arc<KpiStore>, epoch: SessionEpoch) -> Self {
    Self { api, store, epoch }
  }

  pub fn store(&self) -> &Arc<KpiStore> {
    &self.store
  }

  /// Drop the cached value so the next read refetches.
  pub fn invalidate(&self, key: DatasetKey) {
    if let Err(e) = self.store.clear_key(key) {
      warn!(dataset = %key, error = %e, "Failed to invalidate dataset");
    }
  }

  /// Cache-first read of one dataset.
  async fn load<T, F, Fut>(&self, key: Key<T>, fetcher: F) -> Result<CacheResult<T>, RequestError>
  where
    T: DatasetValue,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
  {
    let cached = self.store.get(&key);
    if !self.epoch.is_stale(cached.last_fetched_at_millis) {
      if let (Some(data), Some(fetched_at)) = (cached.value, cached.last_fetched_at_millis) {
        debug!(dataset = %key.id(), "Serving dataset from cache");
        return Ok(CacheResult::from_cache(data, fetched_at));
      }
    }

    let data = fetcher().await?;

    if let Err(e) = self.store.set(&key, data.clone()) {
      warn!(dataset = %key.id(), error = %e, "Failed to cache dataset");
    }
    debug!(dataset = %key.id(), "Fetched dataset from API");

    let fetched_at = self.store.get(&key).last_fetched_at_millis;
    Ok(CacheResult::from_network(data, fetched_at))
  }

  pub async fn section_cards(&self) -> Result<CacheResult<SectionCards>, RequestError> {
    self
      .load(keys::SECTION_CARDS, || self.api.section_cards())
      .await
  }

  pub async fn chart_area(&self) -> Result<CacheResult<Vec<ChartAreaPoint>>, RequestError> {
    self.load(keys::CHART_AREA, || self.api.chart_area()).await
  }

  pub async fn client_meetings(&self) -> Result<CacheResult<Vec<ClientMeeting>>, RequestError> {
    self
      .load(keys::CLIENT_MEETINGS, || self.api.client_meetings())
      .await
  }

  pub async fn new_leads(&self) -> Result<CacheResult<Vec<NewLeads>>, RequestError> {
    self.load(keys::NEW_LEADS, || self.api.new_leads()).await
  }

  pub async fn reasons(&self) -> Result<CacheResult<Vec<Reason>>, RequestError> {
    self.load(keys::REASONS, || self.api.reasons()).await
  }

  pub async fn leads_source(&self) -> Result<CacheResult<Vec<LeadsSource>>, RequestError> {
    self
      .load(keys::LEADS_SOURCE, || self.api.leads_source())
      .await
  }

  pub async fn commercial_sectors(
    &self,
  ) -> Result<CacheResult<Vec<CommercialSectorCount>>, RequestError> {
    self
      .load(keys::COMMERCIAL_SECTORS, || self.api.commercial_sectors())
      .await
  }

  pub async fn leads_source_success_rate(
    &self,
  ) -> Result<CacheResult<Vec<LeadSourceSuccessRate>>, RequestError> {
    self
      .load(keys::LEADS_SOURCE_SUCCESS_RATE, || {
        self.api.leads_source_success_rate()
      })
      .await
  }

  pub async fn commercial_sector_success_rate(
    &self,
  ) -> Result<CacheResult<Vec<CommercialSectorSuccessRate>>, RequestError> {
    self
      .load(keys::COMMERCIAL_SECTOR_SUCCESS_RATE, || {
        self.api.commercial_sector_success_rate()
      })
      .await
  }

  pub async fn salesmen(&self) -> Result<CacheResult<Vec<Salesman>>, RequestError> {
    self.load(keys::SALESMEN, || self.api.salesmen()).await
  }

  pub async fn salesman_performance(
    &self,
  ) -> Result<CacheResult<Vec<SalesmanPerformance>>, RequestError> {
    self
      .load(keys::SALESMAN_PERFORMANCE, || self.api.salesman_performance())
      .await
  }

  pub async fn salesman_success_rate(
    &self,
    salesman_id: u64,
  ) -> Result<CacheResult<Vec<SalesmanSuccessRate>>, RequestError> {
    self
      .load(keys::salesman_success_rate(salesman_id), || {
        self.api.salesman_success_rate(salesman_id)
      })
      .await
  }

  /// Meeting classification (not cached - fetched on selection).
  pub async fn meeting_classification(
    &self,
    meeting_id: u64,
  ) -> Result<ClientClassification, RequestError> {
    self.api.meeting_classification(meeting_id).await
  }

  /// Create a salesman and append it to the cached list if that list is
  /// fresh. A list restored from an earlier session is dropped instead, so the
  /// next read refetches it rather than stamping old data as new.
  pub async fn create_salesman(&self, name: &str) -> Result<Salesman, RequestError> {
    let salesman = self.api.create_salesman(name).await?;

    let cached = self.store.get(&keys::SALESMEN);
    if self.epoch.is_stale(cached.last_fetched_at_millis) {
      if let Err(e) = self.store.clear(&keys::SALESMEN) {
        warn!(error = %e, "Failed to invalidate cached salesmen");
      }
    } else if let Some(mut salesmen) = cached.value {
      salesmen.push(salesman.clone());
      if let Err(e) = self.store.set(&keys::SALESMEN, salesmen) {
        warn!(error = %e, "Failed to update cached salesmen");
      }
    }

    Ok(salesman)
  }

  /// Create a meeting. The cached meeting list is dropped so it refetches.
  pub async fn create_client_meeting(
    &self,
    meeting: &CreateClientMeeting,
  ) -> Result<ClientMeeting, RequestError> {
    let created = self.api.create_client_meeting(meeting).await?;
    self.invalidate(DatasetKey::ClientMeetings);
    Ok(created)
  }

  /// Bulk import. Meetings and salesmen may both have changed afterwards.
  pub async fn upload_csv(
    &self,
    file_name: &str,
    contents: Vec<u8>,
  ) -> Result<UploadOutcome, RequestError> {
    let outcome = self.api.upload_csv(file_name, contents).await?;
    self.invalidate(DatasetKey::ClientMeetings);
    if !outcome.created_salesmen.is_empty() {
      self.invalidate(DatasetKey::Salesmen);
    }
    Ok(outcome)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::client::ApiClient;
  use crate::auth::MemoryCredentialStore;
  use crate::cache::{CacheSource, MemoryStorage};
  use chrono::Utc;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn reasons_body() -> serde_json::Value {
    serde_json::json!([
      {"reason": "Price", "quantity": 4},
      {"reason": "Integrations", "quantity": 2}
    ])
  }

  fn client(server: &MockServer, store: Arc<KpiStore>, epoch: SessionEpoch) -> CachedDashboardClient {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let api = DashboardApi::new(ApiClient::new(&server.uri(), credentials).unwrap());
    CachedDashboardClient::new(api, store, epoch)
  }

  #[tokio::test]
  async fn test_fetches_once_per_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/kpi/vambe-reason"))
      .respond_with(ResponseTemplate::new(200).set_body_json(reasons_body()))
      .expect(1)
      .mount(&server)
      .await;

    let epoch = SessionEpoch::from_millis(Utc::now().timestamp_millis() - 1);
    let dashboard = client(&server, Arc::new(KpiStore::in_memory()), epoch);

    let first = dashboard.reasons().await.unwrap();
    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(first.data.len(), 2);

    let second = dashboard.reasons().await.unwrap();
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(second.data, first.data);
    assert_eq!(second.fetched_at_millis, first.fetched_at_millis);
  }

  #[tokio::test]
  async fn test_restored_snapshot_is_refetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/kpi/vambe-reason"))
      .respond_with(ResponseTemplate::new(200).set_body_json(reasons_body()))
      .expect(1)
      .mount(&server)
      .await;

    let storage = Arc::new(MemoryStorage::new());
    {
      let previous = KpiStore::open(Arc::clone(&storage));
      previous
        .set(
          &keys::REASONS,
          vec![Reason {
            reason: "Old".to_string(),
            quantity: 1.0,
          }],
        )
        .unwrap();
    }

    // New process: the epoch is after the persisted fetch time.
    let epoch = SessionEpoch::from_millis(Utc::now().timestamp_millis() + 1);
    let store = Arc::new(KpiStore::open(Arc::clone(&storage)));
    assert_eq!(store.get(&keys::REASONS).value.unwrap()[0].reason, "Old");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let dashboard = client(&server, store, epoch);
    let result = dashboard.reasons().await.unwrap();
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data[0].reason, "Price");
  }

  #[tokio::test]
  async fn test_failed_fetch_keeps_last_known_value() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/kpi/vambe-reason"))
      .respond_with(
        ResponseTemplate::new(500).set_body_json(serde_json::json!({"message": "boom"})),
      )
      .mount(&server)
      .await;

    let store = Arc::new(KpiStore::in_memory());
    let old = vec![Reason {
      reason: "Old".to_string(),
      quantity: 1.0,
    }];
    store.set(&keys::REASONS, old.clone()).unwrap();
    let before = store.get(&keys::REASONS);

    // Session started after the cached fetch, so the value is stale.
    let epoch = SessionEpoch::from_millis(before.last_fetched_at_millis.unwrap());
    let dashboard = client(&server, Arc::clone(&store), epoch);

    let err = dashboard.reasons().await.unwrap_err();
    assert_eq!(err.message, "boom");
    assert_eq!(dashboard.store().get(&keys::REASONS), before);
  }

  #[tokio::test]
  async fn test_datasets_are_independent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/kpi/vambe-reason"))
      .respond_with(ResponseTemplate::new(200).set_body_json(reasons_body()))
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/kpi/new-leads"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let epoch = SessionEpoch::from_millis(Utc::now().timestamp_millis() - 1);
    let dashboard = client(&server, Arc::new(KpiStore::in_memory()), epoch);

    let (reasons, leads) = futures::join!(dashboard.reasons(), dashboard.new_leads());
    assert!(reasons.is_ok());
    assert!(leads.is_err());
    assert!(dashboard.store().get(&keys::NEW_LEADS).is_empty());
    assert!(!dashboard.store().get(&keys::REASONS).is_empty());
  }

  #[tokio::test]
  async fn test_create_salesman_appends_to_cached_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/salesmen/all"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
        {"id": 1, "name": "Toro", "createdAt": "2024-01-01", "updatedAt": "2024-01-01"}
      ])))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("POST"))
      .and(path("/salesmen"))
      .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!(
        {"id": 2, "name": "Boris", "createdAt": "2024-02-01", "updatedAt": "2024-02-01"}
      )))
      .mount(&server)
      .await;

    let epoch = SessionEpoch::from_millis(Utc::now().timestamp_millis() - 1);
    let dashboard = client(&server, Arc::new(KpiStore::in_memory()), epoch);

    dashboard.salesmen().await.unwrap();
    dashboard.create_salesman("Boris").await.unwrap();

    let salesmen = dashboard.salesmen().await.unwrap();
    assert_eq!(salesmen.source, CacheSource::Cache);
    let names: Vec<_> = salesmen.data.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Toro", "Boris"]);
  }

  #[tokio::test]
  async fn test_create_salesman_drops_list_from_earlier_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/salesmen/all"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
        {"id": 1, "name": "Toro", "createdAt": "2024-01-01", "updatedAt": "2024-01-01"},
        {"id": 2, "name": "Boris", "createdAt": "2024-02-01", "updatedAt": "2024-02-01"},
        {"id": 3, "name": "Puma", "createdAt": "2024-03-01", "updatedAt": "2024-03-01"}
      ])))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("POST"))
      .and(path("/salesmen"))
      .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!(
        {"id": 3, "name": "Puma", "createdAt": "2024-03-01", "updatedAt": "2024-03-01"}
      )))
      .mount(&server)
      .await;

    let storage = Arc::new(MemoryStorage::new());
    {
      let previous = KpiStore::open(Arc::clone(&storage));
      previous
        .set(
          &keys::SALESMEN,
          vec![Salesman {
            id: 1,
            name: "Toro".to_string(),
            created_at: "2024-01-01".to_string(),
            updated_at: "2024-01-01".to_string(),
          }],
        )
        .unwrap();
    }

    let epoch = SessionEpoch::from_millis(Utc::now().timestamp_millis() + 1);
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let dashboard = client(&server, Arc::new(KpiStore::open(Arc::clone(&storage))), epoch);

    dashboard.create_salesman("Puma").await.unwrap();
    assert!(dashboard.store().get(&keys::SALESMEN).is_empty());

    let salesmen = dashboard.salesmen().await.unwrap();
    assert_eq!(salesmen.source, CacheSource::Network);
    assert_eq!(salesmen.data.len(), 3);
  }

  #[tokio::test]
  async fn test_per_salesman_rates_cached_separately() {
    let server = MockServer::start().await;

    for id in [1, 2] {
      Mock::given(method("GET"))
        .and(path(format!("/kpi/salesman-success-rate/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
          {"commercialSector": "RETAIL", "closed": id, "notClosed": 1, "successRate": 50}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    }

    let epoch = SessionEpoch::from_millis(Utc::now().timestamp_millis() - 1);
    let dashboard = client(&server, Arc::new(KpiStore::in_memory()), epoch);

    assert_eq!(dashboard.salesman_success_rate(1).await.unwrap().data[0].closed, 1);
    assert_eq!(dashboard.salesman_success_rate(2).await.unwrap().data[0].closed, 2);
    assert_eq!(
      dashboard.salesman_success_rate(1).await.unwrap().source,
      CacheSource::Cache
    );
  }
}
