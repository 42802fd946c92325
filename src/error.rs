//! Store-level error types.

use crate::persist::PersistError;
use crate::pokeapi::{EntryId, FetchError};
use std::fmt;
use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to load the catalog: {0}")]
  CatalogFetch(#[source] FetchError),

  #[error("failed to load details for entry {id}: {source}")]
  DetailFetch {
    id: EntryId,
    #[source]
    source: FetchError,
  },

  #[error(transparent)]
  Persist(#[from] PersistError),

  #[error("failed to set up the catalog client: {0}")]
  Setup(#[source] FetchError),
}

/// User-facing error flag held by the store after a failed operation.
///
/// The flag is a display concern, not a diagnostic one: it tells the UI
/// which banner to show. The operation that set it also returns the full
/// [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFlag {
  /// The catalog summary page could not be loaded.
  CatalogLoad,
  /// A detail view could not be loaded.
  DetailLoad,
}

impl fmt::Display for ErrorFlag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ErrorFlag::CatalogLoad => write!(f, "Failed to load Pokémon. Please try again."),
      ErrorFlag::DetailLoad => write!(f, "Failed to load Pokémon details. Please try again."),
    }
  }
}
