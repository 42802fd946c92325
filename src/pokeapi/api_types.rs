//! Serde-deserializable types matching PokeAPI responses.
//!
//! These types are separate from domain types so deserialization can follow
//! the remote JSON exactly while the domain structs stay free of API quirks.
//! Top-level responses carry a catch-all for fields outside the schema; the
//! conversions log and drop whatever lands there.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::types::{DetailRecord, PokemonDetail, SpeciesInfo, SpriteSet, StatValue, SummaryRecord};

// ============================================================================
// Summary page endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiPage {
  /// Total collection size reported by the remote, independent of `limit`.
  #[serde(default)]
  pub count: u64,
  #[serde(default)]
  pub results: Vec<ApiSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSummary {
  pub name: String,
  pub url: String,
}

impl ApiSummary {
  pub fn into_summary(self) -> SummaryRecord {
    SummaryRecord {
      name: self.name,
      url: self.url,
    }
  }
}

// ============================================================================
// Detail endpoint response
// ============================================================================

/// A `{ "name": ... }` reference, used all over the API for nested resources.
#[derive(Debug, Deserialize)]
pub struct ApiNamed {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTypeSlot {
  #[serde(default)]
  pub slot: u32,
  #[serde(rename = "type")]
  pub type_ref: ApiNamed,
}

#[derive(Debug, Deserialize)]
pub struct ApiAbilitySlot {
  #[serde(default)]
  pub slot: u32,
  pub ability: ApiNamed,
}

#[derive(Debug, Deserialize)]
pub struct ApiStatSlot {
  #[serde(default)]
  pub base_stat: u32,
  pub stat: ApiNamed,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiArtwork {
  pub front_default: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiOtherSprites {
  #[serde(rename = "official-artwork", default)]
  pub official_artwork: ApiArtwork,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSprites {
  pub front_default: Option<String>,
  #[serde(default)]
  pub other: ApiOtherSprites,
}

#[derive(Debug, Deserialize)]
pub struct ApiPokemon {
  pub id: u32,
  pub name: String,
  #[serde(default)]
  pub height: u32,
  #[serde(default)]
  pub weight: u32,
  pub base_experience: Option<u32>,
  #[serde(default)]
  pub abilities: Vec<ApiAbilitySlot>,
  #[serde(default)]
  pub stats: Vec<ApiStatSlot>,
  #[serde(default)]
  pub types: Vec<ApiTypeSlot>,
  #[serde(default)]
  pub sprites: ApiSprites,
  // Catch-all for fields outside the schema (moves, game_indices, ...)
  #[serde(flatten)]
  pub extra: HashMap<String, Value>,
}

impl ApiPokemon {
  pub fn into_detail(self) -> DetailRecord {
    log_ignored("pokemon", self.id, &self.extra);

    let mut abilities = self.abilities;
    abilities.sort_by_key(|a| a.slot);
    let mut types = self.types;
    types.sort_by_key(|t| t.slot);

    DetailRecord {
      id: self.id,
      name: self.name,
      types: types.into_iter().map(|t| t.type_ref.name).collect(),
      sprites: SpriteSet {
        front_default: self.sprites.front_default,
        official_artwork: self.sprites.other.official_artwork.front_default,
      },
      detail: PokemonDetail {
        height: self.height,
        weight: self.weight,
        base_experience: self.base_experience,
        abilities: abilities.into_iter().map(|a| a.ability.name).collect(),
        stats: self
          .stats
          .into_iter()
          .map(|s| StatValue {
            name: s.stat.name,
            base: s.base_stat,
          })
          .collect(),
      },
    }
  }
}

// ============================================================================
// Species endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiFlavorText {
  #[serde(default)]
  pub flavor_text: String,
  pub language: ApiNamed,
}

#[derive(Debug, Deserialize)]
pub struct ApiGenus {
  #[serde(default)]
  pub genus: String,
  pub language: ApiNamed,
}

#[derive(Debug, Deserialize)]
pub struct ApiSpecies {
  pub id: u32,
  #[serde(default)]
  pub flavor_text_entries: Vec<ApiFlavorText>,
  #[serde(default)]
  pub genera: Vec<ApiGenus>,
  pub habitat: Option<ApiNamed>,
  pub color: Option<ApiNamed>,
  pub capture_rate: Option<u32>,
  #[serde(default)]
  pub is_legendary: bool,
  #[serde(default)]
  pub is_mythical: bool,
  #[serde(flatten)]
  pub extra: HashMap<String, Value>,
}

impl ApiSpecies {
  pub fn into_species(self) -> SpeciesInfo {
    log_ignored("pokemon-species", self.id, &self.extra);

    SpeciesInfo {
      genus: pick_english_genus(&self.genera),
      flavor_text: pick_english_flavor(&self.flavor_text_entries),
      habitat: self.habitat.map(|h| h.name),
      color: self.color.map(|c| c.name),
      capture_rate: self.capture_rate,
      is_legendary: self.is_legendary,
      is_mythical: self.is_mythical,
    }
  }
}

// ============================================================================
// Helpers
// ============================================================================

fn pick_english_flavor(entries: &[ApiFlavorText]) -> Option<String> {
  entries
    .iter()
    .find(|e| e.language.name == "en")
    .map(|e| normalize_flavor(&e.flavor_text))
}

fn pick_english_genus(entries: &[ApiGenus]) -> Option<String> {
  entries
    .iter()
    .find(|g| g.language.name == "en")
    .map(|g| g.genus.clone())
}

/// Flavor text embeds form feeds and raw newlines from the game data;
/// normalize them to plain spaces.
fn normalize_flavor(raw: &str) -> String {
  raw
    .chars()
    .map(|c| if c == '\n' || c == '\u{c}' { ' ' } else { c })
    .collect()
}

fn log_ignored(resource: &str, id: u32, extra: &HashMap<String, Value>) {
  if !extra.is_empty() {
    let mut keys: Vec<&str> = extra.keys().map(String::as_str).collect();
    keys.sort_unstable();
    debug!(resource, id, ignored = %keys.join(","), "dropping response fields outside the schema");
  }
}
