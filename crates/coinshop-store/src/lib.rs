//! Storage layer for coinshop.
//!
//! This crate provides durable storage for accounts, transfer history and
//! purchased inventory, plus the transactional unit-of-work contract the
//! ledger engine builds its money movements on.
//!
//! # Architecture
//!
//! Each store is consumed through a narrow capability trait:
//!
//! - [`AccountStore`]: insert and look up accounts
//! - [`HistoryStore`]: read (and clean up) transfer records
//! - [`InventoryStore`]: read (and clean up) purchased items
//!
//! All writes that move coins go through a [`UnitOfWork`] obtained from
//! [`LedgerStore::begin`]. A unit of work locks account rows in ascending id
//! order, stages balance changes and appended rows, and either commits all of
//! them or, when dropped uncommitted, none.
//!
//! Two backends implement the contract:
//!
//! - [`PgStore`]: PostgreSQL via `sqlx`, row locks via `SELECT ... FOR UPDATE`
//! - [`MemoryStore`]: in-process, one async mutex per account row
//!
//! # Example
//!
//! ```no_run
//! use coinshop_core::NewAccount;
//! use coinshop_store::{AccountStore, MemoryStore};
//!
//! # async fn example() -> coinshop_store::Result<()> {
//! let store = MemoryStore::new();
//! let account = store
//!     .insert_account(NewAccount::registration("alice", "hash"))
//!     .await?;
//!
//! let found = store.find_account_by_username("alice").await?;
//! assert_eq!(found.map(|a| a.id), Some(account.id));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod pg;

use std::collections::BTreeMap;

use async_trait::async_trait;

use coinshop_core::{
    Account, InventoryEntry, InventoryEntryId, NewAccount, NewTransfer, TransferId,
    TransferRecord, UserId,
};

pub use error::{Result, StoreError};
pub use memory::{FaultPoint, MemoryStore};
pub use pg::{PgStore, PoolSettings};

/// Account table capabilities.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// - `StoreError::UsernameTaken` if the username is already registered.
    /// - `StoreError::Database` if the database operation fails.
    async fn insert_account(&self, account: NewAccount) -> Result<Account>;

    /// Get an account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_account_by_id(&self, id: UserId) -> Result<Option<Account>>;
}

/// Transfer history capabilities.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Transfers paid by `username`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn transfers_sent_by(&self, username: &str) -> Result<Vec<TransferRecord>>;

    /// Transfers received by `username`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn transfers_received_by(&self, username: &str) -> Result<Vec<TransferRecord>>;

    /// Delete a transfer record. Compensating cleanup only, never part of
    /// the normal transfer flow.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record doesn't exist.
    async fn delete_transfer(&self, id: TransferId) -> Result<()>;
}

/// Inventory capabilities.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Owned count per item name for one account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn inventory_of(&self, owner: UserId) -> Result<BTreeMap<String, u64>>;

    /// Delete one inventory row. Cleanup only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the row doesn't exist.
    async fn delete_inventory_entry(&self, id: InventoryEntryId) -> Result<()>;
}

/// A store that can open transactional units of work across all three tables.
#[async_trait]
pub trait LedgerStore: AccountStore + HistoryStore + InventoryStore {
    /// Open a unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction cannot be started.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

/// A transactional boundary: every staged write commits together or not at all.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls it
/// back and releases its row locks.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Lock account rows for update and return their current state.
    ///
    /// Rows are locked in ascending id order regardless of the order of
    /// `ids`, so two units of work touching the same pair of accounts can
    /// never deadlock. Ids with no row are absent from the result. Call once
    /// per unit of work with every row it will touch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn lock_accounts(&mut self, ids: &[UserId]) -> Result<Vec<Account>>;

    /// Add `delta` to a locked account's balance and return the new balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotLocked` if the row was not locked by this unit of work.
    /// - `StoreError::Database` if the new balance would be negative.
    async fn adjust_balance(&mut self, id: UserId, delta: i64) -> Result<i64>;

    /// Append a transfer record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn append_transfer(&mut self, transfer: NewTransfer) -> Result<TransferRecord>;

    /// Append one inventory row for `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn grant_item(&mut self, owner: UserId, item: &str) -> Result<InventoryEntry>;

    /// Commit every staged write.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; nothing is applied in that case.
    async fn commit(self: Box<Self>) -> Result<()>;
}
