//! Preference store
//!
//! Best-effort, key-prefixed JSON storage for per-user UI preferences.
//! Values live in a single JSON document on disk. Nothing here is a source
//! of truth: every read falls back to the caller's default and every
//! failure is logged as a warning instead of being returned.

use crate::config::{
    clamp_auto_save_delay, DEFAULT_DEBOUNCE_MS, PREFERENCES_FILE_NAME, PREFERENCE_KEY_PREFIX,
};
use crate::error::Result;
use crate::services::sorting::SortKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::Mutex;

/// Preference key for the file list sort order
pub const SORT_KEY: &str = "files.sort";

/// Preference key for the autosave debounce delay in milliseconds
pub const AUTOSAVE_DELAY_KEY: &str = "editor.autosave_delay_ms";

/// Key-prefixed preference storage
#[derive(Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    prefix: String,
    write_lock: Arc<Mutex<()>>,
}

impl PreferenceStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: Some(data_dir.join(PREFERENCES_FILE_NAME)),
            prefix: PREFERENCE_KEY_PREFIX.to_string(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A store with no backing storage; reads yield defaults, writes are dropped
    pub fn unavailable() -> Self {
        Self {
            path: None,
            prefix: PREFERENCE_KEY_PREFIX.to_string(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Read a preference, falling back to `default`
    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(path) = &self.path else {
            return default;
        };

        let entries = match load_entries(path).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to read preferences from {:?}: {}", path, e);
                return default;
            }
        };

        let Some(raw) = entries.get(&self.namespaced(key)) else {
            return default;
        };

        match serde_json::from_value(raw.clone()) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to decode preference {}: {}", key, e);
                default
            }
        }
    }

    /// Store a preference; failures are logged and swallowed
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize preference {}: {}", key, e);
                return;
            }
        };

        let key = self.namespaced(key);
        self.modify(|entries| {
            entries.insert(key, value);
        })
        .await;
    }

    /// Remove a preference; failures are logged and swallowed
    pub async fn remove(&self, key: &str) {
        let key = self.namespaced(key);
        self.modify(|entries| {
            entries.remove(&key);
        })
        .await;
    }

    async fn modify(&self, apply: impl FnOnce(&mut Map<String, Value>)) {
        let Some(path) = &self.path else {
            return;
        };

        let _guard = self.write_lock.lock().await;

        let mut entries = match load_entries(path).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Discarding unreadable preferences at {:?}: {}", path, e);
                Map::new()
            }
        };

        apply(&mut entries);

        if let Err(e) = save_entries(path, &entries).await {
            tracing::warn!("Failed to write preferences to {:?}: {}", path, e);
        }
    }

    /// Autosave delay, clamped into the supported range
    pub async fn autosave_delay(&self) -> Duration {
        let delay_ms: u64 = self.get(AUTOSAVE_DELAY_KEY, DEFAULT_DEBOUNCE_MS).await;
        clamp_auto_save_delay(delay_ms)
    }

    /// Sort order of the file list
    pub async fn sort_key(&self) -> SortKey {
        self.get(SORT_KEY, SortKey::default()).await
    }
}

async fn load_entries(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = fs::read_to_string(path).await?;
    let entries = serde_json::from_str(&content)?;
    Ok(entries)
}

async fn save_entries(path: &Path, entries: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(entries)?;

    // Write to temp file first (atomic write)
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;

    tracing::debug!("Preferences saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (PreferenceStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = PreferenceStore::new(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let (store, _temp) = create_test_store();

        store.set("sidebar.width", &280u32).await;
        store.set("recent", &vec!["a".to_string(), "b".to_string()]).await;

        assert_eq!(store.get("sidebar.width", 0u32).await, 280);
        assert_eq!(
            store.get::<Vec<String>>("recent", vec![]).await,
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_key_returns_default() {
        let (store, _temp) = create_test_store();

        assert_eq!(store.get("nope", 42u32).await, 42);
    }

    #[tokio::test]
    async fn test_unavailable_store_returns_default() {
        let store = PreferenceStore::unavailable();

        store.set("theme", &"dark").await;
        assert!(!store.is_available());
        assert_eq!(store.get("theme", "light".to_string()).await, "light");
    }

    #[tokio::test]
    async fn test_wrong_shape_returns_default() {
        let (store, _temp) = create_test_store();

        store.set("count", &"not a number").await;
        assert_eq!(store.get("count", 7u32).await, 7);
    }

    #[tokio::test]
    async fn test_corrupt_file_returns_default_and_recovers() {
        let (store, temp) = create_test_store();
        std::fs::write(temp.path().join(PREFERENCES_FILE_NAME), "{not json").unwrap();

        assert_eq!(store.get("theme", "light".to_string()).await, "light");

        store.set("theme", &"dark").await;
        assert_eq!(store.get("theme", "light".to_string()).await, "dark");
    }

    #[tokio::test]
    async fn test_remove() {
        let (store, _temp) = create_test_store();

        store.set("theme", &"dark").await;
        store.remove("theme").await;

        assert_eq!(store.get("theme", "light".to_string()).await, "light");
    }

    #[tokio::test]
    async fn test_keys_are_namespaced_on_disk() {
        let (store, temp) = create_test_store();

        store.set("theme", &"dark").await;

        let raw = std::fs::read_to_string(temp.path().join(PREFERENCES_FILE_NAME)).unwrap();
        let entries: Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries.get("notefile.theme"), Some(&Value::from("dark")));
    }

    #[tokio::test]
    async fn test_typed_accessors() {
        let (store, _temp) = create_test_store();

        assert_eq!(store.autosave_delay().await, Duration::from_millis(150));
        assert_eq!(store.sort_key().await, SortKey::NameAsc);

        store.set(AUTOSAVE_DELAY_KEY, &5u64).await;
        store.set(SORT_KEY, &SortKey::ModifiedDesc).await;

        assert_eq!(store.autosave_delay().await, Duration::from_millis(100));
        assert_eq!(store.sort_key().await, SortKey::ModifiedDesc);
    }
}
