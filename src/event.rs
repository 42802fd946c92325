//! Store change notifications.
//!
//! The store publishes an event after every observable state change so that
//! a UI layer can re-render without polling. Subscribers receive events over
//! unbounded channels; a subscriber that falls behind buffers, and one that
//! is dropped is pruned on the next emit.

use crate::error::ErrorFlag;
use crate::pokeapi::EntryId;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A state change published by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
  /// The summary page loaded and the catalog was replaced.
  CatalogLoaded { count: usize },
  /// A batch of detail records merged into the catalog.
  BatchCompleted { completed: usize, total: usize },
  /// Detail backfill finished for the whole catalog.
  BackfillCompleted,
  /// One entry's detail merged into the catalog.
  EntryUpdated { id: EntryId },
  /// The current detail selection changed.
  CurrentChanged { id: Option<EntryId> },
  /// A local edit was applied.
  EntryEdited { id: EntryId },
  /// An entry was added to or removed from the favorites set.
  FavoriteToggled { id: EntryId, favorite: bool },
  /// The search query changed.
  SearchChanged,
  /// The loading flag flipped.
  LoadingChanged { loading: bool },
  /// The error flag was set or cleared.
  ErrorChanged { error: Option<ErrorFlag> },
}

/// Fan-out of store events to any number of subscribers.
#[derive(Default)]
pub struct Subscribers {
  senders: Mutex<Vec<mpsc::UnboundedSender<StoreEvent>>>,
}

impl Subscribers {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a new subscriber and return its receiving end.
  pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    self.senders.lock().unwrap().push(tx);
    rx
  }

  /// Send `event` to every live subscriber, dropping the ones whose
  /// receivers are gone.
  pub fn emit(&self, event: StoreEvent) {
    let mut senders = self.senders.lock().unwrap();
    senders.retain(|tx| tx.send(event.clone()).is_ok());
  }

  /// Number of live subscribers as of the last emit.
  pub fn subscriber_count(&self) -> usize {
    self.senders.lock().unwrap().len()
  }
}
