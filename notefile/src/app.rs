//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and handed to the HTTP layer through
//! `AppState`.

use crate::config::ServerConfig;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::FilesService;
use sqlx::SqlitePool;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub files_service: FilesService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let repo = Repository::new(pool);
        Self {
            files_service: FilesService::new(repo.clone()),
            repo,
        }
    }
}

/// Application setup - called once on startup
pub async fn setup(config: &ServerConfig) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", config.data_dir);

    std::fs::create_dir_all(&config.data_dir)?;

    let pool = create_pool(&config.database_path()).await?;
    let state = AppState::new(pool);

    if let Some(dev) = &config.dev_session {
        state.repo.insert_session(&dev.token, &dev.user_id).await?;
        tracing::info!("Seeded development session for user: {}", dev.user_id);
    }

    tracing::info!("Application initialized successfully");

    Ok(state)
}
