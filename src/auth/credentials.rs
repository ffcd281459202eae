//! Where the bearer token lives between runs.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
#[cfg(test)]
use std::sync::RwLock;

use super::token::is_token_expired;

/// Holder of the current bearer token.
pub trait CredentialStore: Send + Sync {
  fn token(&self) -> Option<String>;

  fn set_token(&self, token: &str) -> Result<()>;

  /// Forget the token. Must not fail if there is none.
  fn remove_token(&self);

  /// Token that is present and not expired.
  fn valid_token(&self) -> Option<String> {
    self.token().filter(|token| !is_token_expired(token))
  }
}

/// Token kept only for the life of the process.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryCredentialStore {
  token: RwLock<Option<String>>,
}

#[cfg(test)]
impl MemoryCredentialStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_token(token: impl Into<String>) -> Self {
    Self {
      token: RwLock::new(Some(token.into())),
    }
  }
}

#[cfg(test)]
impl CredentialStore for MemoryCredentialStore {
  fn token(&self) -> Option<String> {
    self.token.read().ok().and_then(|token| token.clone())
  }

  fn set_token(&self, token: &str) -> Result<()> {
    let mut current = self
      .token
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    *current = Some(token.to_string());
    Ok(())
  }

  fn remove_token(&self) {
    if let Ok(mut current) = self.token.write() {
      *current = None;
    }
  }
}

/// Token persisted to a file in the data directory.
pub struct FileCredentialStore {
  path: PathBuf,
}

impl FileCredentialStore {
  /// Store at the default location.
  pub fn open() -> Result<Self> {
    Ok(Self::at(crate::config::data_dir()?.join("auth-token")))
  }

  pub fn at(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl CredentialStore for FileCredentialStore {
  fn token(&self) -> Option<String> {
    let contents = std::fs::read_to_string(&self.path).ok()?;
    let token = contents.trim();
    if token.is_empty() {
      None
    } else {
      Some(token.to_string())
    }
  }

  fn set_token(&self, token: &str) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create credential directory: {}", e))?;
    }

    std::fs::write(&self.path, token)
      .map_err(|e| eyre!("Failed to write token to {}: {}", self.path.display(), e))
  }

  fn remove_token(&self) {
    match std::fs::remove_file(&self.path) {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove token"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::auth::token::{encode_unsigned, TokenClaims};

  fn token_expiring_at(exp: i64) -> String {
    encode_unsigned(&TokenClaims {
      sub: 1,
      email: "a@b.c".to_string(),
      iat: 0,
      exp,
    })
  }

  #[test]
  fn test_memory_store() {
    let store = MemoryCredentialStore::new();
    assert_eq!(store.token(), None);

    store.set_token("abc").unwrap();
    assert_eq!(store.token().as_deref(), Some("abc"));

    store.remove_token();
    assert_eq!(store.token(), None);
    store.remove_token();
  }

  #[test]
  fn test_valid_token_skips_expired() {
    let expired = MemoryCredentialStore::with_token(token_expiring_at(1));
    assert_eq!(expired.valid_token(), None);
    assert!(expired.token().is_some());

    let live = token_expiring_at(chrono::Utc::now().timestamp() + 3_600);
    let store = MemoryCredentialStore::with_token(live.clone());
    assert_eq!(store.valid_token(), Some(live));
  }

  #[test]
  fn test_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("creds").join("auth-token");
    let store = FileCredentialStore::at(&path);
    assert_eq!(store.token(), None);

    store.set_token("abc").unwrap();
    assert_eq!(store.token().as_deref(), Some("abc"));

    let again = FileCredentialStore::at(&path);
    assert_eq!(again.token().as_deref(), Some("abc"));

    store.remove_token();
    assert_eq!(again.token(), None);
    store.remove_token();
  }
}
