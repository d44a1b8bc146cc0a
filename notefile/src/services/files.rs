//! Files service
//!
//! High-level business logic for a user's files: default naming, name
//! validation and the version-checked update path used by autosave.

use crate::config::{DEFAULT_FILE_NAME_PREFIX, MAX_FILE_NAME_LENGTH};
use crate::database::{FileChanges, Repository, UserFile};
use crate::error::{AppError, Result};
use chrono::Utc;

/// Service for managing user files
#[derive(Clone)]
pub struct FilesService {
    repo: Repository,
}

impl FilesService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new empty file, generating a name when none is given
    pub async fn create_file(&self, user_id: &str, name: Option<String>) -> Result<UserFile> {
        let name = match name {
            Some(name) if !name.trim().is_empty() => validate_name(&name)?,
            _ => default_file_name(),
        };

        tracing::info!("Creating new file: {}", name);

        let file = self.repo.create_file(user_id, &name).await?;

        tracing::info!("File created successfully: {}", file.id);

        Ok(file)
    }

    pub async fn get_file(&self, user_id: &str, id: &str) -> Result<UserFile> {
        self.repo.get_file(user_id, id).await
    }

    /// List all non-deleted files of a user
    pub async fn list_files(&self, user_id: &str) -> Result<Vec<UserFile>> {
        self.repo.list_files(user_id).await
    }

    /// Apply a partial update
    pub async fn update_file(
        &self,
        user_id: &str,
        id: &str,
        mut changes: FileChanges,
    ) -> Result<UserFile> {
        if changes.is_empty() {
            return Err(AppError::Validation(
                "Update must change name or content".to_string(),
            ));
        }

        if let Some(name) = changes.name.take() {
            changes.name = Some(validate_name(&name)?);
        }

        tracing::debug!("Updating file: {}", id);

        let file = self.repo.update_file(user_id, id, &changes).await?;

        tracing::debug!("File updated successfully: {} (version {})", file.id, file.version);

        Ok(file)
    }

    /// Delete a file (soft delete)
    pub async fn delete_file(&self, user_id: &str, id: &str) -> Result<UserFile> {
        tracing::info!("Deleting file: {}", id);

        let file = self.repo.soft_delete_file(user_id, id).await?;

        tracing::info!("File deleted successfully: {}", id);

        Ok(file)
    }

    /// Get count of soft-deleted files (in trash)
    pub async fn count_deleted_files(&self, user_id: &str) -> Result<i64> {
        self.repo.count_deleted_files(user_id).await
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation("File name cannot be blank".to_string()));
    }

    if trimmed.chars().count() > MAX_FILE_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "File name exceeds {} characters",
            MAX_FILE_NAME_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

fn default_file_name() -> String {
    format!(
        "{} {}",
        DEFAULT_FILE_NAME_PREFIX,
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> FilesService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        FilesService::new(Repository::new(pool))
    }

    #[tokio::test]
    async fn test_create_generates_default_name() {
        let service = create_test_service().await;

        let file = service.create_file("alice", None).await.unwrap();
        assert!(file.name.starts_with("Untitled "));

        let blank = service.create_file("alice", Some("   ".into())).await.unwrap();
        assert!(blank.name.starts_with("Untitled "));
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let service = create_test_service().await;

        let file = service
            .create_file("alice", Some("  Groceries ".into()))
            .await
            .unwrap();
        assert_eq!(file.name, "Groceries");
    }

    #[tokio::test]
    async fn test_rejects_long_and_blank_names() {
        let service = create_test_service().await;

        let long = "x".repeat(MAX_FILE_NAME_LENGTH + 1);
        let result = service.create_file("alice", Some(long)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let file = service.create_file("alice", None).await.unwrap();
        let result = service
            .update_file("alice", &file.id, FileChanges::rename(" "))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let service = create_test_service().await;
        let file = service.create_file("alice", None).await.unwrap();

        let result = service
            .update_file("alice", &file.id, FileChanges::default().expecting(1))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_hides_file_from_listing() {
        let service = create_test_service().await;

        let file = service.create_file("alice", Some("Gone".into())).await.unwrap();
        service.create_file("alice", Some("Stays".into())).await.unwrap();

        service.delete_file("alice", &file.id).await.unwrap();

        let files = service.list_files("alice").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "Stays");
        assert_eq!(service.count_deleted_files("alice").await.unwrap(), 1);
    }
}
