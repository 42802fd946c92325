use crate::pokeapi::{DetailRecord, EntryId, PokemonDetail, SpeciesInfo, SpriteSet, SummaryRecord};
use serde_json::{Map, Value};
use tracing::debug;

/// One entry in the catalog.
///
/// Starts as a placeholder built from a summary row and is upgraded in place
/// when its detail record arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
  pub id: EntryId,
  pub name: String,
  /// Locator of the full record, from the summary page. Absent for records
  /// resolved directly by id without a summary row.
  pub source_url: Option<String>,
  /// Type tags in slot order; `["unknown"]` until detail loads.
  pub types: Vec<String>,
  pub sprites: SpriteSet,
  pub detail: Option<PokemonDetail>,
  pub species: Option<SpeciesInfo>,
  pub detail_loaded: bool,
}

impl CatalogEntry {
  /// Placeholder entry for a summary row. Sprites are derived from the id so
  /// the catalog can render before any detail fetch completes.
  pub fn placeholder(id: EntryId, summary: &SummaryRecord) -> Self {
    CatalogEntry {
      id,
      name: summary.name.clone(),
      source_url: Some(summary.url.clone()),
      types: vec!["unknown".to_string()],
      sprites: SpriteSet::for_id(id),
      detail: None,
      species: None,
      detail_loaded: false,
    }
  }

  /// Merge a fetched detail record into this entry and mark it detailed.
  /// Sprites keep their derived fallbacks where the remote reports none.
  pub fn merge_detail(&mut self, record: DetailRecord) {
    self.name = record.name;
    self.types = record.types;
    self.sprites.merge_fetched(record.sprites);
    self.detail = Some(record.detail);
    self.detail_loaded = true;
  }

  /// Shallow-merge an edit patch into this entry.
  ///
  /// Fields the schema does not model are skipped here; the overlay still
  /// persists them. Numeric detail fields apply only once the entry is
  /// detailed, since a placeholder carries no detail payload to patch; the
  /// overlay is reapplied after every detail merge, so such edits land as
  /// soon as the detail does.
  pub fn apply_patch(&mut self, patch: &Map<String, Value>) {
    let mut skipped: Vec<&str> = Vec::new();

    for (key, value) in patch {
      match key.as_str() {
        "name" => {
          if let Some(name) = value.as_str() {
            self.name = name.to_string();
          }
        }
        "types" => {
          if let Some(types) = as_string_list(value) {
            self.types = types;
          }
        }
        "height" => {
          if let (Some(detail), Some(height)) = (self.detail.as_mut(), as_u32(value)) {
            detail.height = height;
          }
        }
        "weight" => {
          if let (Some(detail), Some(weight)) = (self.detail.as_mut(), as_u32(value)) {
            detail.weight = weight;
          }
        }
        "base_experience" => {
          if let (Some(detail), Some(xp)) = (self.detail.as_mut(), as_u32(value)) {
            detail.base_experience = Some(xp);
          }
        }
        _ => skipped.push(key),
      }
    }

    if !skipped.is_empty() {
      debug!(
        id = self.id,
        skipped = %skipped.join(","),
        "patch fields outside the schema were not applied"
      );
    }
  }

  /// Case-insensitive substring match against the entry name. An empty
  /// query matches everything.
  pub fn matches_query(&self, query: &str) -> bool {
    if query.is_empty() {
      return true;
    }
    self.name.to_lowercase().contains(&query.to_lowercase())
  }
}

impl From<DetailRecord> for CatalogEntry {
  fn from(record: DetailRecord) -> Self {
    let mut sprites = SpriteSet::for_id(record.id);
    sprites.merge_fetched(record.sprites);

    CatalogEntry {
      id: record.id,
      name: record.name,
      source_url: None,
      types: record.types,
      sprites,
      detail: Some(record.detail),
      species: None,
      detail_loaded: true,
    }
  }
}

fn as_u32(value: &Value) -> Option<u32> {
  value.as_u64().and_then(|v| u32::try_from(v).ok())
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
  value
    .as_array()?
    .iter()
    .map(|item| item.as_str().map(str::to_string))
    .collect()
}
