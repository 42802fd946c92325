//! The reactive catalog store.
//!
//! Owns the in-memory catalog and composes the remote source, the durable
//! edit overlay, and the favorites set behind one handle. Loading is two
//! phase: the summary page lands as placeholder entries immediately, then a
//! background task backfills detail records in batches, merging each one
//! into the catalog as it arrives. Every observable change is published to
//! subscribers as a [`StoreEvent`].
//!
//! The store is a cheap handle over shared state; clone it freely into
//! tasks. Locks are internal and never held across an await.

use crate::config::{CatalogConfig, Config};
use crate::error::{ErrorFlag, StoreError};
use crate::event::{StoreEvent, Subscribers};
use crate::persist::{EditOverlay, FavoritesSet, SqliteStorage, Storage};
use crate::pokeapi::{CatalogSource, DetailRecord, EntryId, PokeClient};
use crate::store::entry::CatalogEntry;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Mutable store state behind the lock.
#[derive(Default)]
struct StoreState {
  entries: Vec<CatalogEntry>,
  current: Option<CatalogEntry>,
  search_query: String,
  loading: bool,
  error: Option<ErrorFlag>,
}

struct StoreInner {
  source: Arc<dyn CatalogSource>,
  config: CatalogConfig,
  state: RwLock<StoreState>,
  overlay: EditOverlay,
  favorites: FavoritesSet,
  subscribers: Subscribers,
}

/// Handle to the catalog store. Clones share the same state.
#[derive(Clone)]
pub struct CatalogStore {
  inner: Arc<StoreInner>,
}

impl CatalogStore {
  /// Store backed by the live API and SQLite state storage.
  ///
  /// Uses the configured storage path, or the platform data directory when
  /// none is set.
  pub fn open(config: &Config) -> Result<Self, StoreError> {
    let client = PokeClient::new(&config.api).map_err(StoreError::Setup)?;
    let storage: Arc<dyn Storage> = match &config.storage.path {
      Some(path) => Arc::new(SqliteStorage::open_at(path)?),
      None => Arc::new(SqliteStorage::open()?),
    };

    Self::new(Arc::new(client), storage, config.catalog.clone())
  }

  /// Store over explicit source and storage implementations.
  pub fn new(
    source: Arc<dyn CatalogSource>,
    storage: Arc<dyn Storage>,
    config: CatalogConfig,
  ) -> Result<Self, StoreError> {
    let overlay = EditOverlay::load(Arc::clone(&storage))?;
    let favorites = FavoritesSet::load(storage)?;

    Ok(CatalogStore {
      inner: Arc::new(StoreInner {
        source,
        config,
        state: RwLock::new(StoreState::default()),
        overlay,
        favorites,
        subscribers: Subscribers::new(),
      }),
    })
  }

  /// Register an observer of store changes.
  pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreEvent> {
    self.inner.subscribers.subscribe()
  }

  // ==========================================================================
  // Loading
  // ==========================================================================

  /// Load the summary page and publish the catalog, then start detail
  /// backfill in the background.
  ///
  /// The catalog is visible as soon as this returns; detail records merge in
  /// batch by batch behind it. On a summary fetch failure the catalog is
  /// left empty, the error flag is set, and no backfill starts.
  pub async fn load_catalog(&self) -> Result<(), StoreError> {
    self.set_loading(true);

    let records = match self.inner.source.fetch_page(self.inner.config.page_size).await {
      Ok(records) => records,
      Err(err) => {
        self.inner.state.write().unwrap().entries.clear();
        self.set_error(Some(ErrorFlag::CatalogLoad));
        self.set_loading(false);
        return Err(StoreError::CatalogFetch(err));
      }
    };

    // Pick up edits persisted by an earlier session before applying them.
    if let Err(err) = self.inner.overlay.reload() {
      warn!(error = %err, "could not reload saved edits; keeping the in-memory overlay");
    }

    let entries: Vec<CatalogEntry> = records
      .iter()
      .enumerate()
      .map(|(index, record)| {
        let mut entry = CatalogEntry::placeholder(index as EntryId + 1, record);
        if let Some(patch) = self.inner.overlay.patch_for(entry.id) {
          entry.apply_patch(&patch);
        }
        entry
      })
      .collect();

    let count = entries.len();
    self.inner.state.write().unwrap().entries = entries;
    self.emit(StoreEvent::CatalogLoaded { count });
    self.set_loading(false);

    let store = self.clone();
    tokio::spawn(async move { store.run_backfill().await });

    Ok(())
  }

  /// Fetch detail records for every not-yet-detailed entry, in fixed-size
  /// batches with a short pause between them.
  async fn run_backfill(&self) {
    let ids: Vec<EntryId> = {
      let state = self.inner.state.read().unwrap();
      state.entries.iter().map(|entry| entry.id).collect()
    };

    // An empty catalog yields no batches but still reports completion below.
    let batch_size = self.inner.config.batch_size.max(1);
    let total = ids.len().div_ceil(batch_size);

    for (index, batch) in ids.chunks(batch_size).enumerate() {
      // Re-check per batch: a concurrent resolve may have detailed an entry
      // since the catalog snapshot above.
      let targets: Vec<(EntryId, String)> = {
        let state = self.inner.state.read().unwrap();
        batch
          .iter()
          .filter_map(|id| {
            state
              .entries
              .iter()
              .find(|entry| entry.id == *id && !entry.detail_loaded)
              .and_then(|entry| entry.source_url.clone().map(|url| (entry.id, url)))
          })
          .collect()
      };

      let fetches = targets.iter().map(|(id, url)| {
        let source = Arc::clone(&self.inner.source);
        async move { (*id, source.fetch_detail(url).await) }
      });

      for (id, result) in join_all(fetches).await {
        match result {
          Ok(record) => self.merge_detail_record(record),
          Err(err) => {
            warn!(id, error = %err, "detail fetch failed; entry keeps placeholder values")
          }
        }
      }

      debug!(batch = index + 1, total, "detail batch finished");
      self.emit(StoreEvent::BatchCompleted {
        completed: index + 1,
        total,
      });

      if index + 1 < total {
        sleep(Duration::from_millis(self.inner.config.batch_delay_ms)).await;
      }
    }

    info!(batches = total, "detail backfill complete");
    self.emit(StoreEvent::BackfillCompleted);
  }

  /// Merge a fetched detail record into its catalog entry, reapplying any
  /// saved edits on top so local changes win over remote data.
  fn merge_detail_record(&self, record: DetailRecord) {
    let id = record.id;
    {
      let mut state = self.inner.state.write().unwrap();
      let entry = match state.entries.iter_mut().find(|entry| entry.id == id) {
        Some(entry) => entry,
        None => return,
      };
      entry.merge_detail(record);
      if let Some(patch) = self.inner.overlay.patch_for(id) {
        entry.apply_patch(&patch);
      }
    }
    self.emit(StoreEvent::EntryUpdated { id });
  }

  // ==========================================================================
  // Detail resolution
  // ==========================================================================

  /// Resolve the full record for one entry and publish it as the current
  /// detail selection.
  ///
  /// An already-detailed catalog entry is returned without touching the
  /// network; its species sub-resource, if missing, is fetched in the
  /// background and merged in when it lands. Anything else is fetched fresh:
  /// detail and species together, both required. On failure the previous
  /// selection is kept and the error flag is set.
  pub async fn resolve_detail(&self, id: EntryId) -> Result<CatalogEntry, StoreError> {
    self.set_loading(true);

    let cached = {
      let state = self.inner.state.read().unwrap();
      state
        .entries
        .iter()
        .find(|entry| entry.id == id && entry.detail_loaded)
        .cloned()
    };

    if let Some(mut entry) = cached {
      if let Some(patch) = self.inner.overlay.patch_for(id) {
        entry.apply_patch(&patch);
      }
      self.set_current(Some(entry.clone()));
      self.set_loading(false);

      if entry.species.is_none() {
        let store = self.clone();
        tokio::spawn(async move { store.backfill_species(id).await });
      }

      return Ok(entry);
    }

    let (detail, species) = tokio::join!(
      self.inner.source.fetch_detail_by_id(id),
      self.inner.source.fetch_species(id)
    );

    let (record, species) = match (detail, species) {
      (Ok(record), Ok(species)) => (record, species),
      (Err(err), _) | (_, Err(err)) => {
        self.set_error(Some(ErrorFlag::DetailLoad));
        self.set_loading(false);
        return Err(StoreError::DetailFetch { id, source: err });
      }
    };

    let mut entry = CatalogEntry::from(record);
    entry.species = Some(species);
    if let Some(patch) = self.inner.overlay.patch_for(id) {
      entry.apply_patch(&patch);
    }

    self.set_current(Some(entry.clone()));
    self.set_loading(false);
    Ok(entry)
  }

  /// Fetch the species sub-resource for an already-detailed entry and merge
  /// it into the catalog and the current selection. Best-effort: failure is
  /// logged, never surfaced.
  async fn backfill_species(&self, id: EntryId) {
    let species = match self.inner.source.fetch_species(id).await {
      Ok(species) => species,
      Err(err) => {
        debug!(id, error = %err, "species fetch failed; leaving species absent");
        return;
      }
    };

    let current_updated = {
      let mut state = self.inner.state.write().unwrap();
      if let Some(entry) = state.entries.iter_mut().find(|entry| entry.id == id) {
        entry.species = Some(species.clone());
      }
      // The selection may have moved on while the fetch was in flight.
      match state.current.as_mut() {
        Some(current) if current.id == id => {
          current.species = Some(species);
          true
        }
        _ => false,
      }
    };

    self.emit(StoreEvent::EntryUpdated { id });
    if current_updated {
      self.emit(StoreEvent::CurrentChanged { id: Some(id) });
    }
  }

  // ==========================================================================
  // Edits and favorites
  // ==========================================================================

  /// Apply an edit patch to the entry with this id.
  ///
  /// The patch lands on the catalog entry and the current selection (when it
  /// is the same id) in one step, then merges into the durable overlay so it
  /// survives restarts and later detail refreshes. Ids without a catalog
  /// entry are still persisted and apply once the entry loads.
  pub fn apply_edit(&self, id: EntryId, patch: &Map<String, Value>) -> Result<(), StoreError> {
    {
      let mut state = self.inner.state.write().unwrap();
      if let Some(entry) = state.entries.iter_mut().find(|entry| entry.id == id) {
        entry.apply_patch(patch);
      }
      if let Some(current) = state.current.as_mut() {
        if current.id == id {
          current.apply_patch(patch);
        }
      }
    }

    self.emit(StoreEvent::EntryEdited { id });
    self.inner.overlay.merge(id, patch)?;
    Ok(())
  }

  /// Re-read the saved edit overlay from storage and reapply every patch
  /// onto its matching catalog entry. Patches without an entry stay
  /// persisted for a later load.
  pub fn reload_saved_edits(&self) -> Result<(), StoreError> {
    self.inner.overlay.reload()?;

    let mut applied = Vec::new();
    {
      let mut state = self.inner.state.write().unwrap();
      for id in self.inner.overlay.ids() {
        let patch = match self.inner.overlay.patch_for(id) {
          Some(patch) => patch,
          None => continue,
        };
        if let Some(entry) = state.entries.iter_mut().find(|entry| entry.id == id) {
          entry.apply_patch(&patch);
          applied.push(id);
        }
      }
    }

    for id in applied {
      self.emit(StoreEvent::EntryEdited { id });
    }
    Ok(())
  }

  /// Flip membership of `id` in the favorites set and persist the result.
  /// Returns whether the entry is now a favorite.
  pub fn toggle_favorite(&self, id: EntryId) -> Result<bool, StoreError> {
    let favorite = self.inner.favorites.toggle(id)?;
    self.emit(StoreEvent::FavoriteToggled { id, favorite });
    Ok(favorite)
  }

  /// Whether `id` is currently a favorite.
  pub fn is_favorite(&self, id: EntryId) -> bool {
    self.inner.favorites.contains(id)
  }

  /// Favorited entries in catalog order, not favorite-add order.
  pub fn favorite_entries(&self) -> Vec<CatalogEntry> {
    let state = self.inner.state.read().unwrap();
    state
      .entries
      .iter()
      .filter(|entry| self.inner.favorites.contains(entry.id))
      .cloned()
      .collect()
  }

  // ==========================================================================
  // Views and flags
  // ==========================================================================

  /// All catalog entries in catalog order.
  pub fn entries(&self) -> Vec<CatalogEntry> {
    self.inner.state.read().unwrap().entries.clone()
  }

  /// The entry with this id, if the catalog holds one.
  pub fn entry(&self, id: EntryId) -> Option<CatalogEntry> {
    let state = self.inner.state.read().unwrap();
    state.entries.iter().find(|entry| entry.id == id).cloned()
  }

  /// Entries whose name contains `query`, case-insensitively. An empty
  /// query returns the full catalog.
  pub fn entries_matching(&self, query: &str) -> Vec<CatalogEntry> {
    let state = self.inner.state.read().unwrap();
    state
      .entries
      .iter()
      .filter(|entry| entry.matches_query(query))
      .cloned()
      .collect()
  }

  /// Entries matching the stored search query.
  pub fn filtered_entries(&self) -> Vec<CatalogEntry> {
    let state = self.inner.state.read().unwrap();
    state
      .entries
      .iter()
      .filter(|entry| entry.matches_query(&state.search_query))
      .cloned()
      .collect()
  }

  pub fn set_search_query(&self, query: &str) {
    let changed = {
      let mut state = self.inner.state.write().unwrap();
      let changed = state.search_query != query;
      state.search_query = query.to_string();
      changed
    };
    if changed {
      self.emit(StoreEvent::SearchChanged);
    }
  }

  pub fn search_query(&self) -> String {
    self.inner.state.read().unwrap().search_query.clone()
  }

  /// The current detail selection, if any.
  pub fn current_detail(&self) -> Option<CatalogEntry> {
    self.inner.state.read().unwrap().current.clone()
  }

  pub fn is_loading(&self) -> bool {
    self.inner.state.read().unwrap().loading
  }

  pub fn error(&self) -> Option<ErrorFlag> {
    self.inner.state.read().unwrap().error
  }

  /// Clear the error flag. Must be called before a later failure can be
  /// told apart from a stale one.
  pub fn clear_error(&self) {
    self.set_error(None);
  }

  /// How many entries are detailed so far, out of the whole catalog.
  pub fn detail_progress(&self) -> (usize, usize) {
    let state = self.inner.state.read().unwrap();
    let loaded = state.entries.iter().filter(|entry| entry.detail_loaded).count();
    (loaded, state.entries.len())
  }

  // ==========================================================================
  // Internal state transitions
  // ==========================================================================

  fn set_loading(&self, loading: bool) {
    let changed = {
      let mut state = self.inner.state.write().unwrap();
      let changed = state.loading != loading;
      state.loading = loading;
      changed
    };
    if changed {
      self.emit(StoreEvent::LoadingChanged { loading });
    }
  }

  fn set_error(&self, error: Option<ErrorFlag>) {
    let changed = {
      let mut state = self.inner.state.write().unwrap();
      let changed = state.error != error;
      state.error = error;
      changed
    };
    if changed {
      self.emit(StoreEvent::ErrorChanged { error });
    }
  }

  /// Replace the current detail selection wholesale.
  fn set_current(&self, entry: Option<CatalogEntry>) {
    let id = entry.as_ref().map(|entry| entry.id);
    self.inner.state.write().unwrap().current = entry;
    self.emit(StoreEvent::CurrentChanged { id });
  }

  fn emit(&self, event: StoreEvent) {
    self.inner.subscribers.emit(event);
  }
}
