//! Remote catalog access: the fetch seam, its reqwest implementation, and
//! the wire/domain type split.

mod api_types;
mod client;
mod types;

pub use client::{CatalogSource, FetchError, PokeClient};
pub use types::{
  DetailRecord, EntryId, PokemonDetail, SpeciesInfo, SpriteSet, StatValue, SummaryRecord,
};
