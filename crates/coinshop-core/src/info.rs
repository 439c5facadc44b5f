//! Read-side aggregate returned by the account query service.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::TransferRecord;

/// A transfer seen from the sender's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentTransfer {
    /// Receiving username.
    pub to_user: String,
    /// Coins sent.
    pub amount: i64,
}

/// A transfer seen from the receiver's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedTransfer {
    /// Sending username.
    pub from_user: String,
    /// Coins received.
    pub amount: i64,
}

impl From<TransferRecord> for SentTransfer {
    fn from(record: TransferRecord) -> Self {
        Self {
            to_user: record.receiver,
            amount: record.amount,
        }
    }
}

impl From<TransferRecord> for ReceivedTransfer {
    fn from(record: TransferRecord) -> Self {
        Self {
            from_user: record.sender,
            amount: record.amount,
        }
    }
}

/// Balance, history and inventory of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    /// Current balance.
    pub coins: i64,
    /// Transfers this account paid, oldest first.
    pub sent: Vec<SentTransfer>,
    /// Transfers this account received, oldest first.
    pub received: Vec<ReceivedTransfer>,
    /// Owned count per item name.
    pub inventory: BTreeMap<String, u64>,
}
