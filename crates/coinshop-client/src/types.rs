//! Request and response types for the coinshop API.

use serde::{Deserialize, Serialize};

/// Login request.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
}

/// Coin transfer request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Receiving username.
    pub to_user: String,
    /// Coins to send.
    pub amount: i64,
}

/// Account overview.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// Current balance.
    pub coins: i64,
    /// Owned items.
    pub inventory: Vec<InventoryItem>,
    /// Transfers in both directions.
    pub coin_history: CoinHistory,
}

impl InfoResponse {
    /// Owned quantity of `item`, zero when not owned.
    #[must_use]
    pub fn quantity_of(&self, item: &str) -> u64 {
        self.inventory
            .iter()
            .find(|entry| entry.item_type == item)
            .map_or(0, |entry| entry.quantity)
    }
}

/// Owned quantity of one item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryItem {
    /// Item name.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Units owned.
    pub quantity: u64,
}

/// Transfer history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CoinHistory {
    /// Incoming transfers.
    pub received: Vec<ReceivedCoins>,
    /// Outgoing transfers.
    pub sent: Vec<SentCoins>,
}

/// One incoming transfer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedCoins {
    /// Sending username.
    pub from_user: String,
    /// Coins received.
    pub amount: i64,
}

/// One outgoing transfer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentCoins {
    /// Receiving username.
    pub to_user: String,
    /// Coins sent.
    pub amount: i64,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Crate version of the service.
    #[serde(default)]
    pub version: String,
    /// Storage backend the service runs on.
    #[serde(default)]
    pub storage: String,
}

/// Error response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub errors: String,
}
