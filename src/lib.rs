//! Client-side cache and sync layer for a PokeAPI-backed catalog.
//!
//! The crate loads a collection in two phases (a cheap summary page first,
//! then per-entry detail in background batches), keeps user edits in a
//! durable overlay that wins over remote data, persists a favorites set,
//! and exposes the whole thing as a reactive store that publishes a
//! [`StoreEvent`] for every observable change.
//!
//! ```no_run
//! use pokedex_core::{CatalogStore, Config};
//!
//! # async fn run() -> Result<(), pokedex_core::StoreError> {
//! let store = CatalogStore::open(&Config::default())?;
//! let mut events = store.subscribe();
//!
//! store.load_catalog().await?;
//! while let Some(event) = events.recv().await {
//!   println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod persist;
pub mod pokeapi;
pub mod store;

pub use config::Config;
pub use error::{ErrorFlag, StoreError};
pub use event::{StoreEvent, Subscribers};
pub use persist::{MemoryStorage, SqliteStorage, Storage};
pub use pokeapi::{CatalogSource, PokeClient};
pub use store::{CatalogEntry, CatalogStore};
