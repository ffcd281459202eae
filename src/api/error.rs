use serde_json::Value;

/// The single error every gateway call fails with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
  /// Human-readable message, suitable to show inline
  pub message: String,
  /// HTTP status, absent for transport failures
  pub status: Option<u16>,
}

impl RequestError {
  pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
    Self {
      message: message.into(),
      status,
    }
  }

  pub fn unauthorized() -> Self {
    Self::new("Unauthorized", Some(401))
  }

  /// Network or transport failure; no response was received.
  pub fn transport(err: impl std::fmt::Display) -> Self {
    Self::new(err.to_string(), None)
  }

  /// Build from a non-2xx response body.
  ///
  /// Uses the body's `message` field (a string, or a list of validation
  /// messages) and falls back to a generic message otherwise.
  pub fn from_response(status: u16, body: &str) -> Self {
    let message = serde_json::from_str::<Value>(body)
      .ok()
      .and_then(|value| extract_message(&value))
      .unwrap_or_else(|| format!("HTTP error {}", status));

    Self::new(message, Some(status))
  }
}

fn extract_message(body: &Value) -> Option<String> {
  match body.get("message")? {
    Value::String(message) if !message.is_empty() => Some(message.clone()),
    Value::Array(items) => {
      let messages: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
      if messages.is_empty() {
        None
      } else {
        Some(messages.join(", "))
      }
    }
    _ => None,
  }
}
