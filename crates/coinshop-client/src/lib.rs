//! Coinshop Client SDK.
//!
//! This crate provides a client library for the coinshop HTTP API.
//!
//! # Example
//!
//! ```no_run
//! use coinshop_client::CoinShopClient;
//!
//! # async fn example() -> Result<(), coinshop_client::ClientError> {
//! let client = CoinShopClient::new("http://coinshop:8080")?;
//!
//! // Logging in with an unknown username registers it with 1000 coins
//! let token = client.authenticate("alice", "password").await?;
//!
//! client.buy_item(&token, "cup").await?;
//! client.send_coin(&token, "bob", 100).await?;
//!
//! let info = client.info(&token).await?;
//! println!("{} coins, {} cups", info.coins, info.quantity_of("cup"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, CoinShopClient};
pub use error::ClientError;
pub use types::*;
