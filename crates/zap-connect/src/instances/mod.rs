//! Instance directory: the account's instances and the current selection.
//!
//! The last selected instance survives restarts through a `SelectionStore`.

mod directory;
mod store;


pub use directory::{DirectoryError, InstanceDirectory};
pub use store::{FileSelectionStore, MemorySelectionStore, SelectionStore};
