/// Identifier of a catalog entry.
///
/// Assigned by enumeration order of the summary page, 1-based, which matches
/// the upstream numbering for the first page of the collection.
pub type EntryId = u32;

/// Base URL of the sprite repository, addressable by entry id.
const SPRITE_REPO: &str =
  "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// One row of the summary page: a name plus the locator of the full record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
  pub name: String,
  pub url: String,
}

/// Image locators for an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteSet {
  /// Small front-facing sprite.
  pub front_default: Option<String>,
  /// Large official artwork.
  pub official_artwork: Option<String>,
}

impl SpriteSet {
  /// Sprite URLs derived from the id alone, usable before any detail fetch.
  pub fn for_id(id: EntryId) -> Self {
    SpriteSet {
      front_default: Some(format!("{}/{}.png", SPRITE_REPO, id)),
      official_artwork: Some(format!("{}/other/official-artwork/{}.png", SPRITE_REPO, id)),
    }
  }

  /// Overlay fetched sprite URLs onto this set, keeping the derived URLs
  /// wherever the remote reports none.
  pub fn merge_fetched(&mut self, fetched: SpriteSet) {
    if fetched.front_default.is_some() {
      self.front_default = fetched.front_default;
    }
    if fetched.official_artwork.is_some() {
      self.official_artwork = fetched.official_artwork;
    }
  }
}

/// One base-stat line from a detail record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatValue {
  pub name: String,
  pub base: u32,
}

/// Detail payload of an entry. The schema is closed: fields the remote adds
/// beyond these are dropped at the wire boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PokemonDetail {
  pub height: u32,
  pub weight: u32,
  pub base_experience: Option<u32>,
  /// Ability names in slot order.
  pub abilities: Vec<String>,
  pub stats: Vec<StatValue>,
}

/// Species sub-resource: descriptive text and classification flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesInfo {
  pub genus: Option<String>,
  pub flavor_text: Option<String>,
  pub habitat: Option<String>,
  pub color: Option<String>,
  pub capture_rate: Option<u32>,
  pub is_legendary: bool,
  pub is_mythical: bool,
}

/// A fully fetched detail record, before it is merged into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
  pub id: EntryId,
  pub name: String,
  /// Type tags in slot order.
  pub types: Vec<String>,
  pub sprites: SpriteSet,
  pub detail: PokemonDetail,
}
