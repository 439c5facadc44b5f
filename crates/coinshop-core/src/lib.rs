//! Core types and utilities for coinshop.
//!
//! This crate provides the foundational types used throughout the coinshop
//! ledger:
//!
//! - **Identifiers**: `UserId`, `TransferId`, `InventoryEntryId`
//! - **Accounts**: `Account`, `NewAccount`
//! - **History**: `TransferRecord`, `NewTransfer`
//! - **Inventory**: `InventoryEntry`
//! - **Catalog**: `Catalog`
//! - **Queries**: `AccountInfo`
//!
//! # Coins
//!
//! Balances are whole coins stored as `i64`. Every account starts with
//! [`STARTING_BALANCE`] coins and a balance can never go below zero.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod catalog;
pub mod error;
pub mod history;
pub mod ids;
pub mod info;
pub mod inventory;

pub use account::{Account, NewAccount, STARTING_BALANCE};
pub use catalog::Catalog;
pub use error::{LedgerError, Result};
pub use history::{NewTransfer, TransferRecord};
pub use ids::{IdError, InventoryEntryId, TransferId, UserId};
pub use info::{AccountInfo, ReceivedTransfer, SentTransfer};
pub use inventory::InventoryEntry;
