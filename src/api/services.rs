//! One typed method per dashboard API endpoint.

use reqwest::multipart::{Form, Part};

use super::client::ApiClient;
use super::error::RequestError;
use super::types::{
  AuthCredentials, AuthResponse, ChartAreaPoint, ClientClassification, ClientMeeting,
  CommercialSectorCount, CommercialSectorSuccessRate, CreateClientMeeting, CreateSalesman,
  LeadSourceSuccessRate, LeadsSource, NewLeads, Reason, Salesman, SalesmanPerformance,
  SalesmanSuccessRate, SectionCards, UploadOutcome, UserProfile,
};

/// Typed wrapper over the REST endpoints.
#[derive(Clone)]
pub struct DashboardApi {
  client: ApiClient,
}

impl DashboardApi {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }

  pub fn client(&self) -> &ApiClient {
    &self.client
  }

  // KPI endpoints

  pub async fn section_cards(&self) -> Result<SectionCards, RequestError> {
    self.client.get("/kpi/section-cards").await
  }

  pub async fn chart_area(&self) -> Result<Vec<ChartAreaPoint>, RequestError> {
    self.client.get("/kpi/chart-area-interactive").await
  }

  pub async fn new_leads(&self) -> Result<Vec<NewLeads>, RequestError> {
    self.client.get("/kpi/new-leads").await
  }

  pub async fn reasons(&self) -> Result<Vec<Reason>, RequestError> {
    self.client.get("/kpi/vambe-reason").await
  }

  pub async fn leads_source(&self) -> Result<Vec<LeadsSource>, RequestError> {
    self.client.get("/kpi/leads-source").await
  }

  pub async fn commercial_sectors(&self) -> Result<Vec<CommercialSectorCount>, RequestError> {
    self.client.get("/kpi/commercial-sectors").await
  }

  pub async fn leads_source_success_rate(
    &self,
  ) -> Result<Vec<LeadSourceSuccessRate>, RequestError> {
    self.client.get("/kpi/leads-source-success-rate").await
  }

  pub async fn commercial_sector_success_rate(
    &self,
  ) -> Result<Vec<CommercialSectorSuccessRate>, RequestError> {
    self.client.get("/kpi/commercial-sector-success-rate").await
  }

  pub async fn salesman_performance(&self) -> Result<Vec<SalesmanPerformance>, RequestError> {
    self.client.get("/kpi/salesman-performance").await
  }

  pub async fn salesman_success_rate(
    &self,
    salesman_id: u64,
  ) -> Result<Vec<SalesmanSuccessRate>, RequestError> {
    let endpoint = format!("/kpi/salesman-success-rate/{}", salesman_id);
    self.client.get(&endpoint).await
  }

  // Salesmen

  pub async fn salesmen(&self) -> Result<Vec<Salesman>, RequestError> {
    self.client.get("/salesmen/all").await
  }

  pub async fn create_salesman(&self, name: &str) -> Result<Salesman, RequestError> {
    let body = CreateSalesman {
      name: name.to_string(),
    };
    self.client.post("/salesmen", &body).await
  }

  // Client meetings

  pub async fn client_meetings(&self) -> Result<Vec<ClientMeeting>, RequestError> {
    self.client.get("/client-meetings/all").await
  }

  pub async fn create_client_meeting(
    &self,
    meeting: &CreateClientMeeting,
  ) -> Result<ClientMeeting, RequestError> {
    self.client.post("/client-meetings", meeting).await
  }

  /// Upload a CSV of meetings. Parsing and validation happen server-side.
  pub async fn upload_csv(
    &self,
    file_name: &str,
    contents: Vec<u8>,
  ) -> Result<UploadOutcome, RequestError> {
    let part = Part::bytes(contents)
      .file_name(file_name.to_string())
      .mime_str("text/csv")
      .map_err(|e| RequestError::new(format!("Invalid upload: {}", e), None))?;
    let form = Form::new().part("file", part);

    self
      .client
      .post_multipart("/csv-parser/client-meetings", form)
      .await
  }

  pub async fn meeting_classification(
    &self,
    meeting_id: u64,
  ) -> Result<ClientClassification, RequestError> {
    let endpoint = format!("/client-classifications/meeting/{}", meeting_id);
    self.client.get(&endpoint).await
  }

  // Auth

  pub async fn sign_in(&self, credentials: &AuthCredentials) -> Result<AuthResponse, RequestError> {
    self.client.post("/auth/signin", credentials).await
  }

  pub async fn sign_up(&self, credentials: &AuthCredentials) -> Result<AuthResponse, RequestError> {
    self.client.post("/auth/signup", credentials).await
  }

  pub async fn current_profile(&self) -> Result<UserProfile, RequestError> {
    self.client.get("/users/me").await
  }
}
