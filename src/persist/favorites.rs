//! Durable favorites set.

use super::storage::{PersistError, Storage};
use crate::pokeapi::EntryId;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Storage key holding the favorite entry ids.
const FAVORITES_KEY: &str = "favorites";

/// The set of entry ids the user has marked as favorites.
pub struct FavoritesSet {
  storage: Arc<dyn Storage>,
  ids: Mutex<BTreeSet<EntryId>>,
}

impl FavoritesSet {
  /// Load favorites from storage. Malformed persisted data is logged and
  /// treated as empty rather than failing the load.
  pub fn load(storage: Arc<dyn Storage>) -> Result<Self, PersistError> {
    let ids = read_ids(storage.as_ref())?;
    Ok(Self {
      storage,
      ids: Mutex::new(ids),
    })
  }

  /// Add `id` to the set if absent, remove it if present, and write the set
  /// through to storage. Returns whether the entry is now a favorite.
  pub fn toggle(&self, id: EntryId) -> Result<bool, PersistError> {
    // Lock held across the write so concurrent toggles cannot land out of
    // order in storage.
    let mut ids = self.ids.lock().unwrap();
    let now_favorite = if ids.contains(&id) {
      ids.remove(&id);
      false
    } else {
      ids.insert(id);
      true
    };

    self.storage.set(FAVORITES_KEY, &encode_ids(&ids))?;
    Ok(now_favorite)
  }

  /// Whether `id` is currently a favorite.
  pub fn contains(&self, id: EntryId) -> bool {
    self.ids.lock().unwrap().contains(&id)
  }

  /// All favorite ids in ascending order.
  pub fn ids(&self) -> Vec<EntryId> {
    self.ids.lock().unwrap().iter().copied().collect()
  }
}

/// Decode the favorites list from storage, tolerating missing or malformed
/// data.
fn read_ids(storage: &dyn Storage) -> Result<BTreeSet<EntryId>, PersistError> {
  let raw = match storage.get(FAVORITES_KEY)? {
    Some(raw) => raw,
    None => return Ok(BTreeSet::new()),
  };

  let values: Vec<Value> = match serde_json::from_str(&raw) {
    Ok(values) => values,
    Err(err) => {
      warn!(key = FAVORITES_KEY, error = %err, "discarding malformed favorites");
      return Ok(BTreeSet::new());
    }
  };

  let mut ids = BTreeSet::new();
  for value in values {
    match value.as_u64().and_then(|id| EntryId::try_from(id).ok()) {
      Some(id) => {
        ids.insert(id);
      }
      None => {
        warn!(key = FAVORITES_KEY, "skipping favorite that is not an entry id");
      }
    }
  }

  Ok(ids)
}

fn encode_ids(ids: &BTreeSet<EntryId>) -> String {
  let values: Vec<Value> = ids.iter().map(|id| Value::from(*id)).collect();
  Value::Array(values).to_string()
}
