//! Sign-in, sign-up and sign-out against the API.

use std::sync::Arc;
use tracing::{info, warn};

use super::credentials::CredentialStore;
use super::token::{user_from_token, User};
use crate::api::error::RequestError;
use crate::api::services::DashboardApi;
use crate::api::types::{AuthCredentials, UserProfile};
use crate::cache::KpiStore;

/// Session management. Owns the link between the token and the KPI store:
/// signing out drops both so the next user never sees the previous one's data.
#[derive(Clone)]
pub struct AuthService {
  api: DashboardApi,
  store: Arc<KpiStore>,
}

impl AuthService {
  pub fn new(api: DashboardApi, store: Arc<KpiStore>) -> Self {
    Self { api, store }
  }

  fn credentials(&self) -> &Arc<dyn CredentialStore> {
    self.api.client().credentials()
  }

  pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, RequestError> {
    let credentials = AuthCredentials {
      email: email.to_string(),
      password: password.to_string(),
    };
    let response = self.api.sign_in(&credentials).await?;
    self.accept_token(&response.access_token)
  }

  pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, RequestError> {
    let credentials = AuthCredentials {
      email: email.to_string(),
      password: password.to_string(),
    };
    let response = self.api.sign_up(&credentials).await?;
    self.accept_token(&response.access_token)
  }

  fn accept_token(&self, token: &str) -> Result<User, RequestError> {
    let user = user_from_token(token)
      .ok_or_else(|| RequestError::new("Received an unreadable access token", None))?;

    self
      .credentials()
      .set_token(token)
      .map_err(|e| RequestError::new(format!("Failed to store access token: {}", e), None))?;

    info!(user = %user.email, "Signed in");
    Ok(user)
  }

  /// Forget the token and every cached dataset.
  pub fn sign_out(&self) {
    self.credentials().remove_token();
    if let Err(e) = self.store.clear_all() {
      warn!(error = %e, "Failed to clear KPI store on sign out");
    }
    info!("Signed out");
  }

  /// User described by the stored token, if it is still valid.
  pub fn current_user(&self) -> Option<User> {
    self
      .credentials()
      .valid_token()
      .and_then(|token| user_from_token(&token))
  }

  pub fn is_authenticated(&self) -> bool {
    self.current_user().is_some()
  }

  /// Profile as the server sees it. A 401 here also drops the token.
  pub async fn profile(&self) -> Result<UserProfile, RequestError> {
    self.api.current_profile().await
  }
}
