//! Coin transfer history.
//!
//! Every successful transfer appends exactly one record. Records name both
//! parties by username, so history stays readable without joins.

use serde::{Deserialize, Serialize};

use crate::TransferId;

/// An immutable history entry for one coin transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Store-assigned identifier.
    pub id: TransferId,
    /// Username of the paying account.
    pub sender: String,
    /// Username of the credited account.
    pub receiver: String,
    /// Coins moved. Always positive.
    pub amount: i64,
}

/// Insert payload for a transfer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransfer {
    /// Username of the paying account.
    pub sender: String,
    /// Username of the credited account.
    pub receiver: String,
    /// Coins moved.
    pub amount: i64,
}

impl NewTransfer {
    /// Attach the store-assigned id.
    #[must_use]
    pub fn into_record(self, id: TransferId) -> TransferRecord {
        TransferRecord {
            id,
            sender: self.sender,
            receiver: self.receiver,
            amount: self.amount,
        }
    }
}
