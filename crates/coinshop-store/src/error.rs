//! Error types for coinshop storage.

use coinshop_core::LedgerError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// The unique username constraint rejected an insert.
    #[error("username already taken: {username}")]
    UsernameTaken {
        /// The contested username.
        username: String,
    },

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Key that did not resolve.
        id: String,
    },

    /// A balance was adjusted without first locking the account row.
    #[error("account {id} is not locked by this unit of work")]
    NotLocked {
        /// The account id.
        id: String,
    },

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken { username } => Self::AlreadyExists { username },
            StoreError::NotFound {
                entity: "account",
                id,
            } => Self::AccountNotFound { account: id },
            StoreError::Database(msg) | StoreError::Migration(msg) => Self::Storage(msg),
            err @ (StoreError::NotFound { .. } | StoreError::NotLocked { .. }) => {
                Self::Storage(err.to_string())
            }
        }
    }
}
