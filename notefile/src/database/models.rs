//! Database models
//!
//! Rust structs representing persisted entities.
//! All models use serde for serialization over the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user's text file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserFile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub content: String,
    pub word_count: i64,
    pub char_count: i64,
    pub line_count: i64,
    pub size_bytes: i64,
    /// Bumped by one on every successful content update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set only on the response to a create call
    #[sqlx(skip)]
    #[serde(default)]
    pub is_new: bool,
}

impl UserFile {
    pub fn stats(&self) -> FileStats {
        FileStats {
            word_count: self.word_count,
            char_count: self.char_count,
            line_count: self.line_count,
            size_bytes: self.size_bytes,
        }
    }
}

/// Counts derived from file content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileStats {
    pub word_count: i64,
    pub char_count: i64,
    pub line_count: i64,
    pub size_bytes: i64,
}

impl FileStats {
    pub fn from_content(content: &str) -> Self {
        let line_count = if content.is_empty() {
            0
        } else {
            content.matches('\n').count() + 1
        };

        Self {
            word_count: content.split_whitespace().count() as i64,
            char_count: content.chars().count() as i64,
            line_count: line_count as i64,
            size_bytes: content.len() as i64,
        }
    }
}

/// Create file request
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateFileRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial update of a file
///
/// Fields left as `None` are untouched. When `expected_version` is set the
/// update only applies if it still matches the stored version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

impl FileChanges {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn expecting(mut self, version: i64) -> Self {
        self.expected_version = Some(version);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none()
    }
}

/// A folder as presented in the file browser
///
/// Folders are not persisted by the backend; some sources omit a
/// modification time, in which case sorting falls back to `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Bearer session resolved to a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_of_empty_content() {
        assert_eq!(FileStats::from_content(""), FileStats::default());
    }

    #[test]
    fn test_stats_count_words_lines_and_bytes() {
        let stats = FileStats::from_content("héllo world\nsecond  line\n");
        assert_eq!(stats.word_count, 4);
        assert_eq!(stats.line_count, 3);
        assert_eq!(stats.char_count, 25);
        assert_eq!(stats.size_bytes, 26);
    }

    #[test]
    fn test_changes_skip_absent_fields() {
        let json = serde_json::to_value(FileChanges::content("x").expecting(3)).unwrap();
        assert_eq!(json, serde_json::json!({"content": "x", "expected_version": 3}));
    }
}
