//! Client error types.

/// Errors that can occur when using the coinshop client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing, forged or expired token, or wrong password.
    #[error("unauthorized")]
    Unauthorized,

    /// The service rejected the operation (unknown item or receiver,
    /// insufficient balance, invalid amount).
    #[error("rejected: {message}")]
    Rejected {
        /// Server-provided reason.
        message: String,
    },

    /// Server returned any other error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether the service reported an insufficient balance.
    #[must_use]
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, Self::Rejected { message } if message.starts_with("insufficient balance"))
    }
}
