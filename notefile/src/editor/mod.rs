//! Editor core
//!
//! Client-side state for an open file:
//! - `debounce`: cancellable delayed callbacks and debounced preference writes
//! - `autosave`: dirty tracking and version-checked saves
//! - `status`: the save indicator shown in the editor header

pub mod autosave;
pub mod debounce;
pub mod status;

pub use autosave::{AutosaveSession, ConflictResolution, EditorSnapshot};
pub use debounce::{make_debounced, DebouncedSetter, Debouncer};
pub use status::{SaveStatus, StatusFlags};
