//! HTTP client for the `/api/files` surface
//!
//! Every call needs a bearer session; without one it fails with
//! `Unauthorized` before touching the network. Responses are parsed into
//! typed [`UserFile`]s and checked for internal consistency, so untyped or
//! drifting payloads never reach the editor.

use super::FileStore;
use crate::config::REQUEST_TIMEOUT;
use crate::database::{CreateFileRequest, FileChanges, FileStats, UserFile};
use crate::error::{AppError, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Successful response envelope
#[derive(Deserialize, Debug)]
struct DataEnvelope<T> {
    data: T,
}

/// Error response envelope
#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: String,
    #[serde(default)]
    current_version: Option<i64>,
}

/// Authenticated client for a user's files
#[derive(Clone)]
pub struct FileClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<String>,
}

impl FileClient {
    /// Create a client for the backend at `base_url` (e.g. `http://127.0.0.1:3000`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("notefile/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        })
    }

    /// Attach the bearer token of a signed-in session
    pub fn with_session(mut self, token: impl Into<String>) -> Self {
        self.session = Some(token.into());
        self
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    fn token(&self) -> Result<&str> {
        self.session
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized("No active session".to_string()))
    }

    fn files_url(&self) -> String {
        format!("{}/api/files", self.base_url)
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/api/files/{}", self.base_url, id)
    }

    async fn send<T: DeserializeOwned + Send>(
        &self,
        request: RequestBuilder,
        target: Option<(&str, Option<i64>)>,
    ) -> Result<T> {
        let token = self.token()?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let envelope: DataEnvelope<T> = serde_json::from_slice(&body).map_err(|e| {
                AppError::Validation(format!("Malformed response from server: {}", e))
            })?;
            return Ok(envelope.data);
        }

        Err(error_for_status(status, &body, target))
    }
}

fn error_for_status(
    status: StatusCode,
    body: &[u8],
    target: Option<(&str, Option<i64>)>,
) -> AppError {
    let envelope = serde_json::from_slice::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.clone())
        .unwrap_or_else(|| status.to_string());
    let id = target.map(|(id, _)| id.to_string()).unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::BAD_REQUEST => AppError::Validation(message),
        StatusCode::NOT_FOUND => AppError::FileNotFound(id),
        StatusCode::CONFLICT => match envelope.and_then(|e| e.current_version) {
            Some(current) => AppError::VersionConflict {
                id,
                expected: target.and_then(|(_, expected)| expected),
                current,
            },
            None => {
                tracing::warn!("Conflict response without a current version: {}", message);
                AppError::Generic(format!("Server returned {}: {}", status, message))
            }
        },
        _ => {
            tracing::warn!("File API returned status {}: {}", status, message);
            AppError::Generic(format!("Server returned {}: {}", status, message))
        }
    }
}

/// Reject payloads whose derived fields disagree with their content
fn check_file(file: UserFile) -> Result<UserFile> {
    if file.version < 1 {
        return Err(AppError::Validation(format!(
            "File {} has invalid version {}",
            file.id, file.version
        )));
    }

    if file.stats() != FileStats::from_content(&file.content) {
        return Err(AppError::Validation(format!(
            "File {} has stats that do not match its content",
            file.id
        )));
    }

    Ok(file)
}

impl FileStore for FileClient {
    async fn list(&self) -> Result<Vec<UserFile>> {
        let files: Vec<UserFile> = self.send(self.http.get(self.files_url()), None).await?;
        files.into_iter().map(check_file).collect()
    }

    async fn get(&self, id: &str) -> Result<UserFile> {
        let file = self
            .send(self.http.get(self.file_url(id)), Some((id, None)))
            .await?;
        check_file(file)
    }

    async fn create(&self, name: Option<String>) -> Result<UserFile> {
        let request = self.http.post(self.files_url()).json(&CreateFileRequest { name });
        let file = self.send(request, None).await?;
        check_file(file)
    }

    async fn update(&self, id: &str, changes: FileChanges) -> Result<UserFile> {
        let expected = changes.expected_version;
        let request = self.http.patch(self.file_url(id)).json(&changes);
        let file = self.send(request, Some((id, expected))).await?;
        check_file(file)
    }

    async fn soft_delete(&self, id: &str) -> Result<UserFile> {
        let file = self
            .send(self.http.delete(self.file_url(id)), Some((id, None)))
            .await?;
        check_file(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_calls_without_session_are_unauthorized() {
        // Port 9 (discard) is never contacted: the session check comes first
        let client = FileClient::new("http://127.0.0.1:9").unwrap();
        assert!(!client.has_session());

        let err = client.list().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = client.create(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_error_statuses_map_to_kinds() {
        let body = br#"{"error":"nope"}"#;

        let kind = |status| error_for_status(status, body, Some(("f1", Some(1)))).kind();
        assert_eq!(kind(StatusCode::UNAUTHORIZED), ErrorKind::Unauthorized);
        assert_eq!(kind(StatusCode::BAD_REQUEST), ErrorKind::Validation);
        assert_eq!(kind(StatusCode::NOT_FOUND), ErrorKind::NotFound);
        assert_eq!(kind(StatusCode::INTERNAL_SERVER_ERROR), ErrorKind::Internal);
        assert_eq!(kind(StatusCode::BAD_GATEWAY), ErrorKind::Internal);
    }

    #[test]
    fn test_conflict_carries_versions() {
        let body = br#"{"error":"stale","current_version":4}"#;

        match error_for_status(StatusCode::CONFLICT, body, Some(("f1", Some(2)))) {
            AppError::VersionConflict {
                id,
                expected,
                current,
            } => {
                assert_eq!(id, "f1");
                assert_eq!(expected, Some(2));
                assert_eq!(current, 4);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_unversioned_conflict_is_still_a_conflict() {
        let body = br#"{"error":"Version conflict","current_version":3}"#;

        let err = error_for_status(StatusCode::CONFLICT, body, Some(("f1", None)));
        assert_eq!(err.kind(), ErrorKind::VersionConflict);
        assert!(matches!(
            err,
            AppError::VersionConflict {
                expected: None,
                current: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_check_file_rejects_drifted_stats() {
        let file: UserFile = serde_json::from_value(serde_json::json!({
            "id": "f1",
            "user_id": "alice",
            "name": "Draft",
            "content": "two words",
            "word_count": 5,
            "char_count": 9,
            "line_count": 1,
            "size_bytes": 9,
            "version": 2,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "deleted_at": null
        }))
        .unwrap();

        let err = check_file(file.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let fixed = UserFile {
            word_count: 2,
            ..file
        };
        assert!(check_file(fixed).is_ok());
    }
}
