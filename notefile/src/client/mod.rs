//! Remote file repository
//!
//! [`FileStore`] is the seam the editor depends on. [`FileClient`] is the
//! HTTP implementation that talks to the `/api/files` surface.

pub mod files;

pub use files::FileClient;

use crate::database::{FileChanges, UserFile};
use crate::error::Result;
use std::future::Future;

/// CRUD operations over the caller's files
pub trait FileStore: Send + Sync + 'static {
    /// All non-deleted files of the caller, in no particular order
    fn list(&self) -> impl Future<Output = Result<Vec<UserFile>>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = Result<UserFile>> + Send;

    /// Create an empty file at version 1
    fn create(&self, name: Option<String>) -> impl Future<Output = Result<UserFile>> + Send;

    /// Apply a partial update; content changes bump the version by one
    fn update(
        &self,
        id: &str,
        changes: FileChanges,
    ) -> impl Future<Output = Result<UserFile>> + Send;

    fn soft_delete(&self, id: &str) -> impl Future<Output = Result<UserFile>> + Send;
}
