//! File routes
//!
//! CRUD over the caller's files. Request bodies are parsed by hand so a
//! malformed body maps to a 400 with our error envelope instead of the
//! framework's plain-text rejection.

use super::{AuthUser, Data};
use crate::app::AppState;
use crate::database::{CreateFileRequest, FileChanges, UserFile};
use crate::error::{AppError, Result};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Soft-deleted file count
#[derive(Debug, Serialize)]
pub struct TrashInfo {
    pub count: i64,
}

fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}

/// List all non-deleted files
pub async fn list_files(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<Vec<UserFile>>>> {
    let files = state.files_service.list_files(&user_id).await?;
    Ok(Data::new(files))
}

/// Create a new file
pub async fn create_file(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Bytes,
) -> Result<(StatusCode, Json<Data<UserFile>>)> {
    let req: CreateFileRequest = parse_body(&body)?;
    let file = state.files_service.create_file(&user_id, req.name).await?;
    Ok((StatusCode::CREATED, Data::new(file)))
}

/// Get a file by ID
pub async fn get_file(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Data<UserFile>>> {
    let file = state.files_service.get_file(&user_id, &id).await?;
    Ok(Data::new(file))
}

/// Update name and/or content
pub async fn update_file(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Data<UserFile>>> {
    let changes: FileChanges = parse_body(&body)?;
    let file = state.files_service.update_file(&user_id, &id, changes).await?;
    Ok(Data::new(file))
}

/// Soft delete a file
pub async fn delete_file(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Data<UserFile>>> {
    let file = state.files_service.delete_file(&user_id, &id).await?;
    Ok(Data::new(file))
}

/// Get count of soft-deleted files
pub async fn trash_count(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Data<TrashInfo>>> {
    let count = state.files_service.count_deleted_files(&user_id).await?;
    Ok(Data::new(TrashInfo { count }))
}
