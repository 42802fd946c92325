//! The reactive catalog store and its entry model.

mod catalog;
mod entry;

pub use catalog::CatalogStore;
pub use entry::CatalogEntry;
