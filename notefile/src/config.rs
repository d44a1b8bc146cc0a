//! Application configuration
//!
//! Central location for configuration constants, resource limits and
//! validation boundaries, plus the environment-driven server config.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

// ===== Autosave =====

/// Default debounce window for autosave and debounced preference writes
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

/// Minimum auto-save delay in milliseconds.
/// Values below this hammer the backend on every keystroke.
pub const MIN_AUTO_SAVE_DELAY_MS: u64 = 100;

/// Maximum auto-save delay in milliseconds (5 minutes).
pub const MAX_AUTO_SAVE_DELAY_MS: u64 = 300_000;

// ===== Files =====

/// Maximum length of a file name in characters
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Prefix for generated file names
pub const DEFAULT_FILE_NAME_PREFIX: &str = "Untitled";

// ===== Preferences =====

/// Namespace prepended to every preference key
pub const PREFERENCE_KEY_PREFIX: &str = "notefile.";

/// Preference file name inside the data directory
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

// ===== Networking =====

/// Timeout applied to every repository client request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default listen address for the backend
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Database file name inside the data directory
pub const DATABASE_FILE_NAME: &str = "notefile.db";

/// How long a connection waits on a locked database before failing
pub const DATABASE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connections in the request-serving pool
pub const DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Runtime configuration for the backend server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub listen_addr: SocketAddr,
    /// Session seeded on startup for local development
    pub dev_session: Option<DevSession>,
}

#[derive(Debug, Clone)]
pub struct DevSession {
    pub user_id: String,
    pub token: String,
}

impl ServerConfig {
    /// Read configuration from `NOTEFILE_*` environment variables
    pub fn from_env() -> crate::error::Result<Self> {
        let data_dir = std::env::var("NOTEFILE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let addr =
            std::env::var("NOTEFILE_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = addr.parse().map_err(|e| {
            crate::error::AppError::Validation(format!("Invalid NOTEFILE_ADDR {}: {}", addr, e))
        })?;

        let dev_session = match (
            std::env::var("NOTEFILE_DEV_USER"),
            std::env::var("NOTEFILE_DEV_TOKEN"),
        ) {
            (Ok(user_id), Ok(token)) if !user_id.is_empty() && !token.is_empty() => {
                Some(DevSession { user_id, token })
            }
            _ => None,
        };

        Ok(Self {
            data_dir,
            listen_addr,
            dev_session,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }
}

/// Clamp a user-supplied autosave delay into the supported range
pub fn clamp_auto_save_delay(delay_ms: u64) -> Duration {
    Duration::from_millis(delay_ms.clamp(MIN_AUTO_SAVE_DELAY_MS, MAX_AUTO_SAVE_DELAY_MS))
}
