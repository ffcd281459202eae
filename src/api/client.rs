use color_eyre::{eyre::eyre, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use super::error::RequestError;
use crate::auth::CredentialStore;

/// Body of an outgoing request.
pub enum RequestBody {
  Empty,
  Json(Value),
  /// File uploads. reqwest sets the multipart content type and boundary.
  Multipart(Form),
}

/// Authenticated HTTP client for the dashboard API.
///
/// Every call is attempted once. Failures of any kind come back as a
/// [`RequestError`]; retrying is up to the caller.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
  credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
  pub fn new(base_url: &str, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
    url::Url::parse(base_url).map_err(|e| eyre!("Invalid API base URL '{}': {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
      credentials,
    })
  }

  pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
    &self.credentials
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// Perform one request and decode the JSON response.
  ///
  /// A bearer token is attached only if the credential store holds an
  /// unexpired one. A 401 response removes the stored token before the error
  /// is returned, so later calls go out unauthenticated.
  pub async fn request<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: RequestBody,
  ) -> Result<T, RequestError> {
    let url = self.url(path);
    debug!(%method, %url, "API request");

    let mut request = self.http.request(method.clone(), &url);

    if let Some(token) = self.credentials.valid_token() {
      request = request.bearer_auth(token);
    }

    request = match body {
      RequestBody::Empty => request.header(CONTENT_TYPE, "application/json"),
      RequestBody::Json(value) => request
        .header(CONTENT_TYPE, "application/json")
        .body(value.to_string()),
      RequestBody::Multipart(form) => request.multipart(form),
    };

    let response = request.send().await.map_err(|e| {
      error!(%method, path, error = %e, "API request failed");
      RequestError::transport(e)
    })?;

    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
      self.credentials.remove_token();
      error!(%method, path, "API request unauthorized, credential removed");
      return Err(RequestError::unauthorized());
    }

    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      let err = RequestError::from_response(status.as_u16(), &body);
      error!(%method, path, status = status.as_u16(), error = %err, "API request failed");
      return Err(err);
    }

    let bytes = response.bytes().await.map_err(|e| {
      error!(%method, path, error = %e, "Failed to read API response");
      RequestError::new(e.to_string(), Some(status.as_u16()))
    })?;

    // Empty bodies decode like JSON null, which covers `()` and `Option<T>`.
    let parsed = if bytes.is_empty() {
      serde_json::from_value(Value::Null)
    } else {
      serde_json::from_slice(&bytes)
    };

    parsed.map_err(|e| {
      error!(%method, path, error = %e, "Failed to parse API response");
      RequestError::new(
        format!("Failed to parse response: {}", e),
        Some(status.as_u16()),
      )
    })
  }

  pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
    self.request(Method::GET, path, RequestBody::Empty).await
  }

  pub async fn post<B: Serialize, T: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T, RequestError> {
    self
      .request(Method::POST, path, RequestBody::Json(to_json(body)?))
      .await
  }

  pub async fn post_multipart<T: DeserializeOwned>(
    &self,
    path: &str,
    form: Form,
  ) -> Result<T, RequestError> {
    self
      .request(Method::POST, path, RequestBody::Multipart(form))
      .await
  }

  pub async fn put<B: Serialize, T: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T, RequestError> {
    self
      .request(Method::PUT, path, RequestBody::Json(to_json(body)?))
      .await
  }

  pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
    self.request(Method::DELETE, path, RequestBody::Empty).await
  }

}

fn to_json<B: Serialize>(body: &B) -> Result<Value, RequestError> {
  serde_json::to_value(body)
    .map_err(|e| RequestError::new(format!("Failed to serialize body: {}", e), None))
}
