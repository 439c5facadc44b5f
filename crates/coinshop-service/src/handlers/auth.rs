//! Login handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Login request. Unknown usernames are registered on first login.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token for the `/api` routes.
    pub token: String,
}

/// Log in (or register) and issue a session token.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(body) = payload?;

    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".into(),
        ));
    }

    let user_id = state
        .engine
        .authenticate(&body.username, &body.password)
        .await?;
    let token = state.authenticator.issue(user_id)?;

    tracing::debug!(user_id = %user_id, "Issued session token");

    Ok(Json(AuthResponse { token }))
}
