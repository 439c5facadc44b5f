//! PostgreSQL storage implementation.
//!
//! This module provides the `PgStore` implementation of the store traits.
//! Every unit of work is a database transaction; account rows are locked
//! with `SELECT ... ORDER BY id FOR UPDATE` so concurrent debits of the same
//! account serialize instead of racing on a stale balance.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, Transaction};

use coinshop_core::{
    Account, InventoryEntry, InventoryEntryId, NewAccount, NewTransfer, TransferId,
    TransferRecord, UserId,
};

use crate::error::{Result, StoreError};
use crate::{AccountStore, HistoryStore, InventoryStore, LedgerStore, UnitOfWork};

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// How long a request may wait for a free connection.
    pub acquire_timeout: Duration,
    /// Connection attempts at startup before giving up.
    pub connect_attempts: u32,
    /// Pause between startup connection attempts.
    pub connect_retry_delay: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 50,
            acquire_timeout: Duration::from_secs(5),
            connect_attempts: 10,
            connect_retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    balance: i64,
}

impl From<UserRow> for Account {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            password_hash: row.password_hash,
            balance: row.balance,
        }
    }
}

#[derive(FromRow)]
struct HistoryRow {
    id: i64,
    sender_name: String,
    receiver_name: String,
    amount: i64,
}

impl From<HistoryRow> for TransferRecord {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: TransferId::new(row.id),
            sender: row.sender_name,
            receiver: row.receiver_name,
            amount: row.amount,
        }
    }
}

/// PostgreSQL-backed storage implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database, retrying while it comes up.
    ///
    /// # Errors
    ///
    /// Returns the last connection error once every attempt has failed.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<Self> {
        let attempts = settings.connect_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let result = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .acquire_timeout(settings.acquire_timeout)
                .connect(database_url)
                .await;

            match result {
                Ok(pool) => {
                    tracing::info!(attempt, "Connected to PostgreSQL");
                    return Ok(Self { pool });
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Waiting for database");
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(settings.connect_retry_delay).await;
                    }
                }
            }
        }

        Err(last_error.map_or_else(
            || StoreError::Database("no connection attempts made".into()),
            StoreError::from,
        ))
    }

    /// Apply the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl AccountStore for PgStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, password_hash, balance)
             VALUES ($1, $2, $3)
             RETURNING id, username, password_hash, balance",
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::UsernameTaken {
                    username: account.username.clone(),
                }
            } else {
                tracing::error!(error = %e, "Failed to insert user");
                StoreError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, balance FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn find_account_by_id(&self, id: UserId) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, balance FROM users WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }
}

#[async_trait]
impl HistoryStore for PgStore {
    async fn transfers_sent_by(&self, username: &str) -> Result<Vec<TransferRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT id, sender_name, receiver_name, amount
             FROM history WHERE sender_name = $1 ORDER BY id",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TransferRecord::from).collect())
    }

    async fn transfers_received_by(&self, username: &str) -> Result<Vec<TransferRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT id, sender_name, receiver_name, amount
             FROM history WHERE receiver_name = $1 ORDER BY id",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TransferRecord::from).collect())
    }

    async fn delete_transfer(&self, id: TransferId) -> Result<()> {
        let result = sqlx::query("DELETE FROM history WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "transfer",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn inventory_of(&self, owner: UserId) -> Result<BTreeMap<String, u64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT item, COUNT(*) FROM inventory WHERE owner_id = $1 GROUP BY item",
        )
        .bind(owner.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(item, count)| (item, u64::try_from(count).unwrap_or_default()))
            .collect())
    }

    async fn delete_inventory_entry(&self, id: InventoryEntryId) -> Result<()> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "inventory entry",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork {
            tx,
            locked: BTreeSet::new(),
        }))
    }
}

/// A unit of work backed by one PostgreSQL transaction.
///
/// `sqlx` rolls the transaction back when it is dropped uncommitted.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
    locked: BTreeSet<UserId>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_accounts(&mut self, ids: &[UserId]) -> Result<Vec<Account>> {
        let mut keys: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        keys.sort_unstable();
        keys.dedup();

        // Row locks are taken in the ORDER BY order.
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, balance
             FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&keys)
        .fetch_all(&mut *self.tx)
        .await?;

        let accounts: Vec<Account> = rows.into_iter().map(Account::from).collect();
        self.locked.extend(accounts.iter().map(|a| a.id));
        Ok(accounts)
    }

    async fn adjust_balance(&mut self, id: UserId, delta: i64) -> Result<i64> {
        if !self.locked.contains(&id) {
            return Err(StoreError::NotLocked { id: id.to_string() });
        }

        let balance: i64 =
            sqlx::query_scalar("UPDATE users SET balance = balance + $1 WHERE id = $2 RETURNING balance")
                .bind(delta)
                .bind(id.get())
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(balance)
    }

    async fn append_transfer(&mut self, transfer: NewTransfer) -> Result<TransferRecord> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO history (sender_name, receiver_name, amount)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&transfer.sender)
        .bind(&transfer.receiver)
        .bind(transfer.amount)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(transfer.into_record(TransferId::new(id)))
    }

    async fn grant_item(&mut self, owner: UserId, item: &str) -> Result<InventoryEntry> {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO inventory (owner_id, item) VALUES ($1, $2) RETURNING id")
                .bind(owner.get())
                .bind(item)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(InventoryEntry {
            id: InventoryEntryId::new(id),
            owner_id: owner,
            item: item.to_string(),
        })
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
