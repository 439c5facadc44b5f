//! Account info handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use coinshop_core::{AccountInfo, LedgerError};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Account overview response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// Current balance.
    pub coins: i64,
    /// Owned items.
    pub inventory: Vec<InventoryItem>,
    /// Transfers in both directions.
    pub coin_history: CoinHistory,
}

/// Owned quantity of one item.
#[derive(Debug, Serialize)]
pub struct InventoryItem {
    /// Item name.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Units owned.
    pub quantity: u64,
}

/// Transfer history.
#[derive(Debug, Serialize)]
pub struct CoinHistory {
    /// Incoming transfers.
    pub received: Vec<ReceivedCoins>,
    /// Outgoing transfers.
    pub sent: Vec<SentCoins>,
}

/// One incoming transfer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedCoins {
    /// Sending username.
    pub from_user: String,
    /// Coins received.
    pub amount: i64,
}

/// One outgoing transfer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentCoins {
    /// Receiving username.
    pub to_user: String,
    /// Coins sent.
    pub amount: i64,
}

impl From<AccountInfo> for InfoResponse {
    fn from(info: AccountInfo) -> Self {
        Self {
            coins: info.coins,
            inventory: info
                .inventory
                .into_iter()
                .map(|(item_type, quantity)| InventoryItem {
                    item_type,
                    quantity,
                })
                .collect(),
            coin_history: CoinHistory {
                received: info
                    .received
                    .into_iter()
                    .map(|r| ReceivedCoins {
                        from_user: r.from_user,
                        amount: r.amount,
                    })
                    .collect(),
                sent: info
                    .sent
                    .into_iter()
                    .map(|s| SentCoins {
                        to_user: s.to_user,
                        amount: s.amount,
                    })
                    .collect(),
            },
        }
    }
}

/// Balance, inventory and transfer history of the caller.
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<InfoResponse>, ApiError> {
    let info = state
        .queries
        .account_info(auth.user_id)
        .await
        .map_err(|e| match e {
            // The token outlived its account.
            LedgerError::AccountNotFound { .. } => ApiError::Unauthorized,
            other => ApiError::from(other),
        })?;

    Ok(Json(info.into()))
}
