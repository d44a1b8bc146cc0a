//! Repository layer for database operations
//!
//! Owner-scoped CRUD for user files plus bearer session lookup.
//! Every file query filters on `user_id` so one user can never read or
//! modify another user's rows.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an empty file at version 1
    pub async fn create_file(&self, user_id: &str, name: &str) -> Result<UserFile> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut file = sqlx::query_as::<_, UserFile>(
            r#"
            INSERT INTO user_files (
                id, user_id, name, content,
                word_count, char_count, line_count, size_bytes,
                version, created_at, updated_at
            )
            VALUES (?, ?, ?, '', 0, 0, 0, 0, 1, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        file.is_new = true;

        tracing::debug!("Created file: {} for user: {}", id, user_id);
        Ok(file)
    }

    /// Get a non-deleted file owned by `user_id`
    pub async fn get_file(&self, user_id: &str, id: &str) -> Result<UserFile> {
        sqlx::query_as::<_, UserFile>(
            r#"
            SELECT * FROM user_files
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::FileNotFound(id.to_string()))
    }

    /// List all non-deleted files owned by `user_id`
    pub async fn list_files(&self, user_id: &str) -> Result<Vec<UserFile>> {
        let files = sqlx::query_as::<_, UserFile>(
            r#"
            SELECT * FROM user_files
            WHERE user_id = ? AND deleted_at IS NULL
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Apply a partial update.
    ///
    /// Only the fields present in `changes` are written, in one statement,
    /// so concurrent partial updates never undo each other. Content changes
    /// recompute the derived stats and bump the version by one. Renames keep
    /// the version. With `expected_version` set, the write lands only while
    /// the stored version still matches.
    pub async fn update_file(
        &self,
        user_id: &str,
        id: &str,
        changes: &FileChanges,
    ) -> Result<UserFile> {
        let stats = changes.content.as_deref().map(FileStats::from_content);

        let updated = sqlx::query_as::<_, UserFile>(
            r#"
            UPDATE user_files SET
                name = COALESCE(?, name),
                content = COALESCE(?, content),
                word_count = COALESCE(?, word_count),
                char_count = COALESCE(?, char_count),
                line_count = COALESCE(?, line_count),
                size_bytes = COALESCE(?, size_bytes),
                version = version + ?,
                updated_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
              AND (? IS NULL OR version = ?)
            RETURNING *
            "#,
        )
        .bind(changes.name.as_deref())
        .bind(changes.content.as_deref())
        .bind(stats.map(|s| s.word_count))
        .bind(stats.map(|s| s.char_count))
        .bind(stats.map(|s| s.line_count))
        .bind(stats.map(|s| s.size_bytes))
        .bind(i64::from(stats.is_some()))
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .bind(changes.expected_version)
        .bind(changes.expected_version)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(file) = updated {
            tracing::debug!("Updated file: {} (version {})", id, file.version);
            return Ok(file);
        }

        // Missing rows surface as FileNotFound here
        let latest = self.get_file(user_id, id).await?;
        Err(AppError::VersionConflict {
            id: id.to_string(),
            expected: changes.expected_version,
            current: latest.version,
        })
    }

    /// Soft delete a file, returning the tombstoned row
    pub async fn soft_delete_file(&self, user_id: &str, id: &str) -> Result<UserFile> {
        let file = sqlx::query_as::<_, UserFile>(
            r#"
            UPDATE user_files SET deleted_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::FileNotFound(id.to_string()))?;

        tracing::debug!("Soft deleted file: {}", id);
        Ok(file)
    }

    /// Count soft-deleted files for a user
    pub async fn count_deleted_files(&self, user_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_files WHERE user_id = ? AND deleted_at IS NOT NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Issue a new session token for `user_id`
    pub async fn create_session(&self, user_id: &str) -> Result<Session> {
        let token = Uuid::new_v4().simple().to_string();
        self.insert_session(&token, user_id).await
    }

    /// Store a caller-chosen token, replacing any previous owner
    pub async fn insert_session(&self, token: &str, user_id: &str) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)
            ON CONFLICT(token) DO UPDATE SET user_id = excluded.user_id
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created session for user: {}", user_id);
        Ok(session)
    }

    /// Resolve a bearer token to its user id
    pub async fn resolve_session(&self, token: &str) -> Result<Option<String>> {
        let user_id: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user_id)
    }

    pub async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
