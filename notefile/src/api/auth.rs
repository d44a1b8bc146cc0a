//! Bearer session extraction
//!
//! Sign-in itself happens with the external identity provider; this layer
//! only resolves the opaque token it hands out to a user id.

use crate::app::AppState;
use crate::error::AppError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        match state.repo.resolve_session(token).await? {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => {
                tracing::debug!("Rejected unknown session token");
                Err(AppError::Unauthorized("Invalid or expired session".to_string()))
            }
        }
    }
}
