//! Coinshop HTTP client implementation.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, AuthRequest, AuthResponse, HealthResponse, InfoResponse, SendCoinRequest,
};

/// Coinshop API client.
///
/// Stateless apart from the connection pool: every authenticated call takes
/// the bearer token returned by [`CoinShopClient::authenticate`].
#[derive(Debug, Clone)]
pub struct CoinShopClient {
    client: Client,
    base_url: Url,
}

impl CoinShopClient {
    /// Create a new coinshop client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the coinshop service (e.g., `"http://coinshop:8080"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the URL is invalid.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new coinshop client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the URL is invalid or the HTTP
    /// client cannot be built.
    pub fn with_options(base_url: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "base URL cannot have a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Log in, registering the username on first use, and return a token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` on a wrong password, or another
    /// error if the request fails.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, ClientError> {
        let request = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint(&["api", "auth"]))
            .json(&request)
            .send()
            .await?;

        let body: AuthResponse = handle_response(response).await?;
        Ok(body.token)
    }

    /// Buy one unit of `item`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rejected` for an unknown item or insufficient
    /// balance, or another error if the request fails.
    pub async fn buy_item(&self, token: &str, item: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["api", "buy", item]))
            .bearer_auth(token)
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// Send `amount` coins to `to_user`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rejected` for an unknown receiver, an invalid
    /// amount or insufficient balance, or another error if the request fails.
    pub async fn send_coin(
        &self,
        token: &str,
        to_user: &str,
        amount: i64,
    ) -> Result<(), ClientError> {
        let request = SendCoinRequest {
            to_user: to_user.to_string(),
            amount,
        };

        let response = self
            .client
            .post(self.endpoint(&["api", "sendCoin"]))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// Get balance, inventory and transfer history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn info(&self, token: &str) -> Result<InfoResponse, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["api", "info"]))
            .bearer_auth(token)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(self.endpoint(&["health"])).send().await?;

        handle_response(response).await
    }

    /// Append path segments (percent-encoded) to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Decode a JSON success body or convert an error response.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        return Ok(serde_json::from_slice(&bytes)?);
    }

    Err(error_from(status, response).await)
}

/// Accept an empty success body or convert an error response.
async fn handle_empty_response(response: reqwest::Response) -> Result<(), ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    Err(error_from(status, response).await)
}

async fn error_from(status: StatusCode, response: reqwest::Response) -> ClientError {
    let message = match response.json::<ApiErrorResponse>().await {
        Ok(body) => body.errors,
        Err(_) => format!("HTTP {status}"),
    };

    tracing::debug!(status = %status, message = %message, "coinshop request failed");

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::BAD_REQUEST => ClientError::Rejected { message },
        _ => ClientError::Api {
            message,
            status: status.as_u16(),
        },
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
