//! HTTP API
//!
//! Routes are grouped by resource:
//! - `files`: CRUD over the caller's files
//! - `auth`: bearer session extraction
//!
//! ## Routes
//!
//! - `GET /health`
//! - `GET /api/files`, `POST /api/files`
//! - `GET|PATCH|DELETE /api/files/:id`
//! - `GET /api/trash`
//!
//! Successful responses are `{"data": ...}`, failures `{"error": "..."}`.

pub mod auth;
pub mod files;

use crate::app::AppState;
use crate::error::{AppError, ErrorKind, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;

pub use auth::AuthUser;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/files", get(files::list_files).post(files::create_file))
        .route(
            "/api/files/:id",
            get(files::get_file)
                .patch(files::update_file)
                .delete(files::delete_file),
        )
        .route("/api/trash", get(files::trash_count))
        .with_state(state)
}

/// Serve the API at `addr` until the process exits
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") }))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self {
            AppError::VersionConflict { current, .. } => {
                json!({ "error": self.to_string(), "current_version": current })
            }
            e if e.kind() == ErrorKind::Internal => {
                tracing::error!("Internal error: {}", e);
                json!({ "error": "Internal server error" })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
