//! Configuration loading tests.

use pokedex_core::config::{Config, ConfigError};
use std::io::Write;

#[test]
fn defaults_cover_every_section() {
  let config = Config::default();

  assert_eq!(config.api.base_url, "https://pokeapi.co/api/v2");
  assert_eq!(config.api.timeout_secs, 30);
  assert_eq!(config.catalog.page_size, 100);
  assert_eq!(config.catalog.batch_size, 20);
  assert_eq!(config.catalog.batch_delay_ms, 100);
  assert!(config.storage.path.is_none());
}

#[test]
fn explicit_file_overrides_defaults() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(
    file,
    "api:\n  base_url: http://localhost:8080/api\n  timeout_secs: 5\ncatalog:\n  page_size: 10\n  batch_size: 2\n  batch_delay_ms: 50"
  )
  .unwrap();

  let config = Config::load(Some(file.path())).unwrap();

  assert_eq!(config.api.base_url, "http://localhost:8080/api");
  assert_eq!(config.api.timeout_secs, 5);
  assert_eq!(config.catalog.page_size, 10);
  assert_eq!(config.catalog.batch_size, 2);
  assert_eq!(config.catalog.batch_delay_ms, 50);
}

#[test]
fn partial_files_keep_defaults_for_missing_sections() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "catalog:\n  batch_size: 5").unwrap();

  let config = Config::load(Some(file.path())).unwrap();

  assert_eq!(config.catalog.batch_size, 5);
  assert_eq!(config.catalog.page_size, 100);
  assert_eq!(config.api.base_url, "https://pokeapi.co/api/v2");
}

#[test]
fn missing_explicit_path_is_an_error() {
  let result = Config::load(Some(std::path::Path::new("/nonexistent/pokedex.yaml")));
  assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "catalog: [not, a, mapping").unwrap();

  let result = Config::load(Some(file.path()));
  assert!(matches!(result, Err(ConfigError::Parse { .. })));
}
