//! Coin transfer handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Transfer request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Receiving username.
    pub to_user: String,
    /// Coins to send.
    pub amount: i64,
}

/// Send coins from the caller to another user.
pub async fn send_coin(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;

    if body.to_user.trim().is_empty() {
        return Err(ApiError::BadRequest("toUser is required".into()));
    }

    state
        .engine
        .transfer_coins(auth.user_id, &body.to_user, body.amount)
        .await?;

    Ok(StatusCode::OK)
}
