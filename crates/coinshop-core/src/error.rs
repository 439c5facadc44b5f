//! Error types for coinshop.

use crate::ids::IdError;

/// Result type for coinshop operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Credentials did not match the stored hash.
    #[error("unauthorized")]
    Unauthorized,

    /// Account not found.
    #[error("account not found: {account}")]
    AccountNotFound {
        /// Username or id that did not resolve.
        account: String,
    },

    /// Item is not in the catalog.
    #[error("item not found: {item}")]
    ItemNotFound {
        /// The requested item name.
        item: String,
    },

    /// Balance too low for the debit.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Username already registered (lost an auto-registration race).
    #[error("account already exists: {username}")]
    AlreadyExists {
        /// The contested username.
        username: String,
    },

    /// Transfer amount must be positive.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Sender and receiver are the same account.
    #[error("cannot transfer coins to yourself")]
    SelfTransfer,

    /// The catalog source is malformed.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Storage error. The message is for logs only.
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Whether the failure is a business-rule rejection rather than an
    /// infrastructure problem.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::InvalidCatalog(_))
    }
}
