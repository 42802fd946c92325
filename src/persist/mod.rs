//! Durable state: key-value storage, the edit overlay, and favorites.

mod favorites;
mod overlay;
mod storage;

pub use favorites::FavoritesSet;
pub use overlay::EditOverlay;
pub use storage::{MemoryStorage, PersistError, SqliteStorage, Storage};
