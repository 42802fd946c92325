//! Durable edit overlay.
//!
//! Local edits are kept as per-entry JSON patches under a single storage
//! key. Patches accumulate across sessions and are reapplied on top of
//! whatever the remote returns, so an edit survives restarts and later
//! detail refreshes.

use super::storage::{PersistError, Storage};
use crate::pokeapi::EntryId;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Storage key holding the edit overlay.
const EDITS_KEY: &str = "updatedRecords";

/// The set of locally edited fields, keyed by entry id.
pub struct EditOverlay {
  storage: Arc<dyn Storage>,
  patches: Mutex<HashMap<EntryId, Map<String, Value>>>,
}

impl EditOverlay {
  /// Load the overlay from storage. Malformed persisted data is logged and
  /// treated as empty rather than failing the load.
  pub fn load(storage: Arc<dyn Storage>) -> Result<Self, PersistError> {
    let patches = read_patches(storage.as_ref())?;
    Ok(Self {
      storage,
      patches: Mutex::new(patches),
    })
  }

  /// Re-read the overlay from storage, replacing the in-memory copy.
  pub fn reload(&self) -> Result<(), PersistError> {
    let fresh = read_patches(self.storage.as_ref())?;
    *self.patches.lock().unwrap() = fresh;
    Ok(())
  }

  /// Merge `patch` into the stored patch for `id` and write the overlay
  /// through to storage. Later values win key-by-key.
  pub fn merge(&self, id: EntryId, patch: &Map<String, Value>) -> Result<(), PersistError> {
    // Lock held across the write so concurrent merges cannot land out of
    // order in storage.
    let mut patches = self.patches.lock().unwrap();
    let entry = patches.entry(id).or_default();
    for (key, value) in patch {
      entry.insert(key.clone(), value.clone());
    }

    self.storage.set(EDITS_KEY, &encode_patches(&patches))
  }

  /// The accumulated patch for `id`, if any edits exist.
  pub fn patch_for(&self, id: EntryId) -> Option<Map<String, Value>> {
    self.patches.lock().unwrap().get(&id).cloned()
  }

  /// Ids that currently carry edits.
  pub fn ids(&self) -> Vec<EntryId> {
    self.patches.lock().unwrap().keys().copied().collect()
  }
}

/// Decode the overlay from storage, tolerating missing or malformed data.
fn read_patches(storage: &dyn Storage) -> Result<HashMap<EntryId, Map<String, Value>>, PersistError> {
  let raw = match storage.get(EDITS_KEY)? {
    Some(raw) => raw,
    None => return Ok(HashMap::new()),
  };

  let value: Value = match serde_json::from_str(&raw) {
    Ok(value) => value,
    Err(err) => {
      warn!(key = EDITS_KEY, error = %err, "discarding malformed saved edits");
      return Ok(HashMap::new());
    }
  };

  let object = match value {
    Value::Object(object) => object,
    other => {
      warn!(
        key = EDITS_KEY,
        found = other_kind(&other),
        "discarding saved edits with unexpected shape"
      );
      return Ok(HashMap::new());
    }
  };

  let mut patches = HashMap::new();
  for (key, value) in object {
    let id: EntryId = match key.parse() {
      Ok(id) => id,
      Err(_) => {
        warn!(key = %key, "skipping saved edit with a non-numeric id");
        continue;
      }
    };
    match value {
      Value::Object(patch) => {
        patches.insert(id, patch);
      }
      other => {
        warn!(
          id,
          found = other_kind(&other),
          "skipping saved edit that is not an object"
        );
      }
    }
  }

  Ok(patches)
}

fn encode_patches(patches: &HashMap<EntryId, Map<String, Value>>) -> String {
  let object: Map<String, Value> = patches
    .iter()
    .map(|(id, patch)| (id.to_string(), Value::Object(patch.clone())))
    .collect();

  Value::Object(object).to_string()
}

fn other_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
