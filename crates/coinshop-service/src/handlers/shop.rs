//! Purchase handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Buy one unit of an item for the caller.
pub async fn buy_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(item): Path<String>,
) -> Result<StatusCode, ApiError> {
    if item.trim().is_empty() {
        return Err(ApiError::BadRequest("item is required".into()));
    }

    state.engine.buy_item(auth.user_id, &item).await?;

    Ok(StatusCode::OK)
}

/// `GET /api/buy/` with no item name.
pub async fn missing_item(_auth: AuthUser) -> ApiError {
    ApiError::BadRequest("item is required".into())
}
