//! Serde types matching the dashboard API's request and response bodies.
//!
//! Field names follow the API's camelCase wire format. Records are plain
//! read copies; the API owns them.

use serde::{Deserialize, Serialize};

// ============================================================================
// KPI summary cards
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trending {
  Up,
  Stable,
  Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionCards {
  pub total_client_meetings: f64,
  pub total_client_meetings_trending: Trending,
  pub total_client_meetings_trending_value: f64,
  pub total_closings: f64,
  pub total_closings_trending: Trending,
  pub total_closings_trending_value: f64,
  pub closing_rate: f64,
  pub closing_rate_trending: Trending,
  pub closing_rate_trending_value: f64,
  pub average_closings_per_month: f64,
  pub average_closings_per_month_trending: Trending,
  pub average_closings_per_month_trending_value: f64,
}

// ============================================================================
// Time series
// ============================================================================

/// One day of the closed/open area chart. Order is not guaranteed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartAreaPoint {
  pub date: String,
  pub closed: i64,
  pub open: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeads {
  pub date_range: String,
  pub meetings_closed: i64,
  pub not_closed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
  pub reason: String,
  pub quantity: f64,
}

// ============================================================================
// Categorical breakdowns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadsSource {
  pub source: String,
  pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialSectorCount {
  pub commercial_sector: String,
  pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSourceSuccessRate {
  pub lead_source: String,
  pub closed: i64,
  pub not_closed: i64,
  pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialSectorSuccessRate {
  pub commercial_sector: String,
  pub closed: i64,
  pub not_closed: i64,
  pub success_rate: f64,
}

/// Per-sector success rate for one salesman. Same shape as the sector breakdown.
pub type SalesmanSuccessRate = CommercialSectorSuccessRate;

// ============================================================================
// Salesmen
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salesman {
  pub id: u64,
  pub name: String,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPerformance {
  /// `YYYY-MM`
  pub month: String,
  pub total_meetings: i64,
  pub closed_meetings: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesmanPerformance {
  #[serde(default)]
  pub salesman_id: Option<u64>,
  pub salesman_name: String,
  #[serde(default)]
  pub data: Vec<MonthlyPerformance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSalesman {
  pub name: String,
}

// ============================================================================
// Client meetings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeeting {
  pub id: u64,
  pub name: String,
  pub email: String,
  pub phone: String,
  pub salesman_name: String,
  pub salesman_id: u64,
  pub date: String,
  pub closed: bool,
  #[serde(default)]
  pub transcription: String,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientMeeting {
  pub name: String,
  pub email: String,
  pub phone: String,
  pub salesman_name: String,
  pub date: String,
  pub closed: bool,
  pub transcription: String,
}

/// A meeting the import skipped because it already existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedMeeting {
  pub name: String,
  pub email: String,
  pub salesman_name: String,
  pub date: String,
}

/// Summary of a CSV bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
  #[serde(default)]
  pub message: String,
  pub total_rows: u64,
  pub valid_rows: u64,
  #[serde(default)]
  pub errors: Vec<String>,
  #[serde(default)]
  pub created_salesmen: Vec<Salesman>,
  #[serde(default)]
  pub created_meetings: Vec<ClientMeeting>,
  #[serde(default)]
  pub already_created_meetings: Vec<SkippedMeeting>,
}

// ============================================================================
// Meeting classification
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedMeeting {
  pub id: u64,
  pub name: String,
  pub email: String,
  pub salesman_name: String,
  pub date: String,
  pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientClassification {
  pub id: u64,
  pub created_at: String,
  pub updated_at: String,
  pub commercial_sector: String,
  pub lead_source: String,
  pub interest_reason: String,
  pub client_meeting_id: u64,
  pub has_demand_peaks: bool,
  pub has_seasonal_demand: bool,
  pub estimated_daily_interactions: f64,
  pub estimated_weekly_interactions: f64,
  pub estimated_monthly_interactions: f64,
  pub has_tech_team: bool,
  pub vambe_model: String,
  pub is_potential_client: bool,
  pub is_problem_client: bool,
  pub is_lost_client: bool,
  pub should_be_contacted: bool,
  pub confidence_score: f64,
  pub model_version: String,
  pub client_meeting: ClassifiedMeeting,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AuthCredentials {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
  pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub id: u64,
  pub email: String,
  #[serde(default)]
  pub role: Option<String>,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name: Option<String>,
}
