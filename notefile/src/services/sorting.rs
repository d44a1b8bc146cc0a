//! Ordering and filtering for the file browser and command palette
//!
//! Pure functions: inputs are never mutated and every sort is stable.

use crate::database::{Folder, UserFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort order for files and folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    ModifiedDesc,
    ModifiedAsc,
    CreatedDesc,
    CreatedAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::ModifiedDesc,
        SortKey::ModifiedAsc,
        SortKey::CreatedDesc,
        SortKey::CreatedAsc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::ModifiedDesc => "modified-desc",
            SortKey::ModifiedAsc => "modified-asc",
            SortKey::CreatedDesc => "created-desc",
            SortKey::CreatedAsc => "created-asc",
        }
    }

    /// Parse a key, falling back to the default for unknown or missing input
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("Unknown sort key: {}", s))
    }
}

/// Anything the file browser can order
pub trait Sortable {
    fn name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    /// Modification time, if the entity tracks one
    fn modified_at(&self) -> Option<DateTime<Utc>>;
}

impl Sortable for UserFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn modified_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

impl Sortable for Folder {
    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Return a new, stably ordered copy of `items`
pub fn sort_items<T: Sortable + Clone>(items: &[T], key: SortKey) -> Vec<T> {
    let mut sorted = items.to_vec();

    let modified = |item: &T| item.modified_at().unwrap_or_else(|| item.created_at());

    match key {
        SortKey::NameAsc => sorted.sort_by(|a, b| compare_names(a.name(), b.name())),
        SortKey::NameDesc => sorted.sort_by(|a, b| compare_names(b.name(), a.name())),
        SortKey::ModifiedDesc => sorted.sort_by(|a, b| modified(b).cmp(&modified(a))),
        SortKey::ModifiedAsc => sorted.sort_by(|a, b| modified(a).cmp(&modified(b))),
        SortKey::CreatedDesc => sorted.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
        SortKey::CreatedAsc => sorted.sort_by(|a, b| a.created_at().cmp(&b.created_at())),
    }

    sorted
}

/// Case-insensitive ordering, so "apple" sorts next to "Apple" rather than
/// after "Zebra". Names equal after folding put lowercase first.
fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded.then_with(|| b.cmp(a))
}

/// Filter files by name or content for the command palette
pub fn search_files(files: &[UserFile], query: &str) -> Vec<UserFile> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return files.to_vec();
    }

    files
        .iter()
        .filter(|file| {
            file.name.to_lowercase().contains(&query)
                || file.content.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn file(id: &str, name: &str, created: i64, updated: i64) -> UserFile {
        UserFile {
            id: id.to_string(),
            user_id: "alice".to_string(),
            name: name.to_string(),
            content: String::new(),
            word_count: 0,
            char_count: 0,
            line_count: 0,
            size_bytes: 0,
            version: 1,
            created_at: at(created),
            updated_at: at(updated),
            deleted_at: None,
            is_new: false,
        }
    }

    fn folder(id: &str, name: &str, created: i64, updated: Option<i64>) -> Folder {
        Folder {
            id: id.to_string(),
            name: name.to_string(),
            created_at: at(created),
            updated_at: updated.map(at),
        }
    }

    fn file_ids(files: &[UserFile]) -> Vec<String> {
        files.iter().map(|f| f.id.clone()).collect()
    }

    fn folder_ids(folders: &[Folder]) -> Vec<String> {
        folders.iter().map(|f| f.id.clone()).collect()
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let files = vec![
            file("1", "zebra", 0, 0),
            file("2", "Apple", 0, 0),
            file("3", "banana", 0, 0),
        ];

        let sorted = sort_items(&files, SortKey::NameAsc);
        assert_eq!(file_ids(&sorted), vec!["2", "3", "1"]);

        let sorted = sort_items(&files, SortKey::NameDesc);
        assert_eq!(file_ids(&sorted), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_lowercase_sorts_before_uppercase_on_ties() {
        let files = vec![
            file("1", "Apple", 0, 0),
            file("2", "apple", 0, 0),
            file("3", "apricot", 0, 0),
        ];

        let sorted = sort_items(&files, SortKey::NameAsc);
        assert_eq!(file_ids(&sorted), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_equal_names_keep_input_order() {
        let files = vec![
            file("1", "Same", 3, 3),
            file("2", "Same", 1, 1),
            file("3", "Same", 2, 2),
        ];

        let sorted = sort_items(&files, SortKey::NameAsc);
        assert_eq!(file_ids(&sorted), vec!["1", "2", "3"]);

        let sorted = sort_items(&files, SortKey::NameDesc);
        assert_eq!(file_ids(&sorted), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_time_sorts() {
        let files = vec![
            file("1", "a", 10, 50),
            file("2", "b", 20, 30),
            file("3", "c", 30, 40),
        ];

        let ordered = |key| file_ids(&sort_items(&files, key));
        assert_eq!(ordered(SortKey::ModifiedDesc), vec!["1", "3", "2"]);
        assert_eq!(ordered(SortKey::ModifiedAsc), vec!["2", "3", "1"]);
        assert_eq!(ordered(SortKey::CreatedDesc), vec!["3", "2", "1"]);
        assert_eq!(ordered(SortKey::CreatedAsc), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_folders_without_modified_fall_back_to_created() {
        let folders = vec![
            folder("1", "a", 10, None),
            folder("2", "b", 0, Some(20)),
            folder("3", "c", 5, Some(5)),
        ];

        let sorted = sort_items(&folders, SortKey::ModifiedDesc);
        assert_eq!(folder_ids(&sorted), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_sorting_is_idempotent_and_pure() {
        let files = vec![
            file("1", "delta", 4, 1),
            file("2", "Alpha", 2, 3),
            file("3", "charlie", 3, 3),
            file("4", "bravo", 1, 2),
        ];
        let before = files.clone();

        for key in SortKey::ALL {
            let once = sort_items(&files, key);
            let twice = sort_items(&once, key);
            assert_eq!(once, twice, "{} not idempotent", key);
        }

        assert_eq!(files, before);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("modified-desc".parse::<SortKey>(), Ok(SortKey::ModifiedDesc));
        assert!("sideways".parse::<SortKey>().is_err());
        assert_eq!(SortKey::parse_or_default(None), SortKey::NameAsc);
        assert_eq!(SortKey::parse_or_default(Some("bogus")), SortKey::NameAsc);

        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>(), Ok(key));
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key));
        }
    }

    #[test]
    fn test_search_files() {
        let mut shopping = file("1", "Shopping List", 0, 0);
        shopping.content = "Buy milk".to_string();
        let files = vec![shopping, file("2", "Todo", 0, 0), file("3", "Meeting", 0, 0)];

        assert_eq!(file_ids(&search_files(&files, "todo")), vec!["2"]);
        assert_eq!(file_ids(&search_files(&files, "MILK")), vec!["1"]);
        assert!(search_files(&files, "nonexistent").is_empty());
        assert_eq!(search_files(&files, "  ").len(), 3);
    }
}
