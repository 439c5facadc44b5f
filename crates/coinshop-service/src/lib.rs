//! Coinshop HTTP API Service.
//!
//! This crate exposes the coinshop ledger over HTTP:
//!
//! - Login with auto-registration (`POST /api/auth`)
//! - Item purchases (`GET /api/buy/{item}`)
//! - Coin transfers (`POST /api/sendCoin`)
//! - Balance, inventory and history (`GET /api/info`)
//!
//! # Authentication
//!
//! `POST /api/auth` returns an HS256 JWT. Every other `/api` route requires it
//! as `Authorization: Bearer <token>`; a missing, forged or expired token is
//! answered with 401.
//!
//! # Errors
//!
//! Failures are returned as `{"errors": "<message>"}`. Rejected operations
//! (unknown item or receiver, insufficient balance, invalid amount) are 400;
//! storage failures are an opaque 500.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Axum handlers must be async

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::{AuthUser, Authenticator, JwtAuthenticator};
pub use config::{ServiceConfig, StorageBackend};
pub use error::{ApiError, StartupError};
pub use routes::create_router;
pub use state::AppState;
