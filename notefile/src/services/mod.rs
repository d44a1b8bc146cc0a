//! Services module
//!
//! Business logic that sits between the HTTP layer, the repository and the
//! editor.

pub mod files;
pub mod preferences;
pub mod sorting;

pub use files::FilesService;
pub use preferences::PreferenceStore;
pub use sorting::{search_files, sort_items, SortKey, Sortable};
