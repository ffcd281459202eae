use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory name used under the platform config and data dirs.
pub const APP_DIR: &str = "vambe-dash";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";

/// Overrides `api.base_url` when set.
pub const BASE_URL_ENV: &str = "VAMBE_API_BASE_URL";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
  /// Persist the KPI store between runs
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// SQLite file; defaults to `<data_dir>/vambe-dash/cache.db`
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

fn default_true() -> bool {
  true
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./vambe-dash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/vambe-dash/config.yaml
  ///
  /// No file at all means defaults. `VAMBE_API_BASE_URL` wins over the file.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
      config.apply_base_url_override(&base_url);
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(format!("{}.yaml", APP_DIR));
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join(APP_DIR).join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file deserializes as null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))
  }

  fn apply_base_url_override(&mut self, base_url: &str) {
    let trimmed = base_url.trim();
    if !trimmed.is_empty() {
      self.api.base_url = trimmed.to_string();
    }
  }

  /// Where the SQLite snapshot lives for this configuration.
  pub fn cache_path(&self) -> Result<PathBuf> {
    match &self.cache.path {
      Some(path) => Ok(path.clone()),
      None => Ok(data_dir()?.join("cache.db")),
    }
  }
}

/// `<data_dir>/vambe-dash`, created on first use.
pub fn data_dir() -> Result<PathBuf> {
  let dir = dirs::data_dir()
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join(APP_DIR);

  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create data directory {}: {}", dir.display(), e))?;

  Ok(dir)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, "http://localhost:3333");
    assert!(config.cache.enabled);
    assert_eq!(config.cache.path, None);
  }

  #[test]
  fn test_partial_file_fills_defaults() {
    let config = Config::parse("cache:\n  enabled: false\n").unwrap();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert!(!config.cache.enabled);
  }

  #[test]
  fn test_empty_file_is_default() {
    assert_eq!(Config::parse("\n").unwrap(), Config::default());
  }

  #[test]
  fn test_full_file() {
    let config = Config::parse(
      "api:\n  base_url: https://api.vambe.me\ncache:\n  enabled: true\n  path: /tmp/kpi.db\n",
    )
    .unwrap();
    assert_eq!(config.api.base_url, "https://api.vambe.me");
    assert_eq!(config.cache_path().unwrap(), PathBuf::from("/tmp/kpi.db"));
  }

  #[test]
  fn test_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "api:\n  base_url: http://10.0.0.2:3333").unwrap();

    let config = Config::load_from_path(file.path()).unwrap();
    assert_eq!(config.api.base_url, "http://10.0.0.2:3333");
  }

  #[test]
  fn test_missing_explicit_path_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(Config::load(Some(&missing)).is_err());
  }

  #[test]
  fn test_invalid_yaml_errors() {
    assert!(Config::parse("api: [unclosed").is_err());
  }

  #[test]
  fn test_base_url_override() {
    let mut config = Config::default();
    config.apply_base_url_override("  ");
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);

    config.apply_base_url_override("https://staging.vambe.me ");
    assert_eq!(config.api.base_url, "https://staging.vambe.me");
  }
}
