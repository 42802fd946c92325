//! Durable key-value storage for store state.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum PersistError {
  #[error("could not determine a data directory for state storage")]
  NoDataDir,

  #[error("state lock poisoned")]
  LockPoisoned,

  #[error("state database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("state directory error: {0}")]
  Io(#[from] std::io::Error),
}

/// String-keyed durable storage. Values are opaque strings; callers own the
/// encoding.
pub trait Storage: Send + Sync {
  /// Read the value stored under `key`, if any.
  fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

  /// Store `value` under `key`, replacing any previous value.
  fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// In-memory storage for tests and ephemeral sessions. Contents are lost
/// when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Storage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
    let values = self.values.lock().map_err(|_| PersistError::LockPoisoned)?;
    Ok(values.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
    let mut values = self.values.lock().map_err(|_| PersistError::LockPoisoned)?;
    values.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// SQLite-backed storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

/// Schema for the state table.
const STATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStorage {
  /// Open (or create) the database at the default location.
  pub fn open() -> Result<Self, PersistError> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open (or create) the database at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self, PersistError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    conn.execute_batch(STATE_SCHEMA)?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Default database path under the platform data directory.
  fn default_path() -> Result<PathBuf, PersistError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or(PersistError::NoDataDir)?;

    Ok(data_dir.join("pokedex-core").join("state.db"))
  }
}

impl Storage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
    let conn = self.conn.lock().map_err(|_| PersistError::LockPoisoned)?;

    let value = conn
      .query_row("SELECT value FROM state WHERE key = ?", params![key], |row| {
        row.get(0)
      })
      .optional()?;

    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
    let conn = self.conn.lock().map_err(|_| PersistError::LockPoisoned)?;

    conn.execute(
      "INSERT OR REPLACE INTO state (key, value, updated_at)
       VALUES (?, ?, datetime('now'))",
      params![key, value],
    )?;

    Ok(())
  }
}
