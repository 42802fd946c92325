use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(String),

  #[error("failed to read config file {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_yaml::Error,
  },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub catalog: CatalogConfig,
  pub storage: StorageConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base URL of the remote catalog API.
  pub base_url: String,
  /// Per-request timeout in seconds.
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://pokeapi.co/api/v2".to_string(),
      timeout_secs: 30,
    }
  }
}

/// Catalog loading settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
  /// Number of summary records fetched on activation.
  pub page_size: u32,
  /// Number of detail fetches issued concurrently per backfill batch.
  pub batch_size: usize,
  /// Pause between backfill batches, in milliseconds.
  pub batch_delay_ms: u64,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      page_size: 100,
      batch_size: 20,
      batch_delay_ms: 100,
    }
  }
}

/// Durable state settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  /// Database path override (defaults to the platform data directory).
  pub path: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./pokedex.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/pokedex-core/config.yaml
  ///
  /// Built-in defaults apply when no file is found; the API needs no
  /// credentials, so running without a config file is the common case.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ConfigError::NotFound(p.display().to_string()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("pokedex.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("pokedex-core").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.display().to_string(),
      source: e,
    })?;

    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
      path: path.display().to_string(),
      source: e,
    })
  }
}
