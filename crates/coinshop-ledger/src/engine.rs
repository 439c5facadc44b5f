//! The ledger engine.
//!
//! Every coin movement runs inside one unit of work: the affected account
//! rows are locked (lowest id first), balances are checked against the
//! locked values, and the balance changes commit together with the history
//! or inventory row that records them. An early return drops the unit of
//! work, which rolls back anything staged so far.

use std::sync::Arc;

use coinshop_core::{
    Account, Catalog, InventoryEntry, LedgerError, NewAccount, NewTransfer, Result,
    TransferRecord, UserId,
};
use coinshop_store::{LedgerStore, StoreError};
use tracing::instrument;

use crate::credentials::CredentialHasher;

/// Log an infrastructure failure and convert it to a ledger error.
pub(crate) fn storage_failure(err: StoreError) -> LedgerError {
    let err = LedgerError::from(err);
    if !err.is_rejection() {
        tracing::error!(error = %err, "Storage operation failed");
    }
    err
}

/// Registration-or-login, coin transfers and item purchases.
#[derive(Clone)]
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    catalog: Arc<Catalog>,
    hasher: CredentialHasher,
}

impl LedgerEngine {
    /// Create an engine over a store and a catalog.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        catalog: Arc<Catalog>,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            store,
            catalog,
            hasher,
        }
    }

    /// The catalog prices are read from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Log in, creating the account on first use of a username.
    ///
    /// A concurrent registration of the same username makes the insert fail
    /// on the unique constraint; the loser then logs in against the winner's
    /// row, so identical credentials all resolve to one account.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Unauthorized` if the password does not match.
    /// - `LedgerError::Storage` on store or hashing failure.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserId> {
        let existing = self
            .store
            .find_account_by_username(username)
            .await
            .map_err(storage_failure)?;

        if let Some(account) = existing {
            return self.check_password(&account, password).await;
        }

        let hash = self.hasher.hash(password).await?;
        match self
            .store
            .insert_account(NewAccount::registration(username, hash))
            .await
        {
            Ok(account) => {
                tracing::info!(
                    user_id = %account.id,
                    username = %account.username,
                    balance = account.balance,
                    "Account registered"
                );
                Ok(account.id)
            }
            Err(StoreError::UsernameTaken { .. }) => {
                tracing::debug!(username = %username, "Registration raced, falling back to login");
                let account = self
                    .store
                    .find_account_by_username(username)
                    .await
                    .map_err(storage_failure)?
                    .ok_or_else(|| {
                        LedgerError::Storage(format!(
                            "account {username} vanished after a unique violation"
                        ))
                    })?;
                self.check_password(&account, password).await
            }
            Err(e) => Err(storage_failure(e)),
        }
    }

    async fn check_password(&self, account: &Account, password: &str) -> Result<UserId> {
        if self.hasher.verify(password, &account.password_hash).await? {
            tracing::debug!(user_id = %account.id, "Login succeeded");
            Ok(account.id)
        } else {
            tracing::debug!(user_id = %account.id, "Password mismatch");
            Err(LedgerError::Unauthorized)
        }
    }

    /// Move `amount` coins from `from` to the account named `to_username`.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` if `amount` is not positive.
    /// - `LedgerError::AccountNotFound` if either party does not exist.
    /// - `LedgerError::SelfTransfer` if both parties are the same account.
    /// - `LedgerError::InsufficientBalance` if the sender cannot pay.
    /// - `LedgerError::Storage` on store failure; nothing is applied.
    #[instrument(skip(self))]
    pub async fn transfer_coins(
        &self,
        from: UserId,
        to_username: &str,
        amount: i64,
    ) -> Result<TransferRecord> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let receiver_id = self
            .store
            .find_account_by_username(to_username)
            .await
            .map_err(storage_failure)?
            .map(|account| account.id)
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: to_username.to_string(),
            })?;

        if receiver_id == from {
            tracing::debug!(user_id = %from, "Rejected transfer to self");
            return Err(LedgerError::SelfTransfer);
        }

        let mut uow = self.store.begin().await.map_err(storage_failure)?;
        let locked = uow
            .lock_accounts(&[from, receiver_id])
            .await
            .map_err(storage_failure)?;

        let sender = locked
            .iter()
            .find(|account| account.id == from)
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: from.to_string(),
            })?;
        let receiver = locked
            .iter()
            .find(|account| account.id == receiver_id)
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: to_username.to_string(),
            })?;

        if !sender.can_afford(amount) {
            tracing::debug!(
                user_id = %from,
                balance = sender.balance,
                amount,
                "Transfer rejected: insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance {
                balance: sender.balance,
                required: amount,
            });
        }

        uow.adjust_balance(from, -amount)
            .await
            .map_err(storage_failure)?;
        uow.adjust_balance(receiver_id, amount)
            .await
            .map_err(storage_failure)?;
        let record = uow
            .append_transfer(NewTransfer {
                sender: sender.username.clone(),
                receiver: receiver.username.clone(),
                amount,
            })
            .await
            .map_err(storage_failure)?;
        uow.commit().await.map_err(storage_failure)?;

        tracing::info!(
            transfer_id = %record.id,
            sender = %record.sender,
            receiver = %record.receiver,
            amount,
            "Coins transferred"
        );

        Ok(record)
    }

    /// Buy one unit of `item` for `user`.
    ///
    /// # Errors
    ///
    /// - `LedgerError::ItemNotFound` if the catalog has no such item.
    /// - `LedgerError::AccountNotFound` if the buyer does not exist.
    /// - `LedgerError::InsufficientBalance` if the buyer cannot pay.
    /// - `LedgerError::Storage` on store failure; nothing is applied.
    #[instrument(skip(self))]
    pub async fn buy_item(&self, user: UserId, item: &str) -> Result<InventoryEntry> {
        let price = self
            .catalog
            .price(item)
            .ok_or_else(|| LedgerError::ItemNotFound {
                item: item.to_string(),
            })?;

        let mut uow = self.store.begin().await.map_err(storage_failure)?;
        let locked = uow.lock_accounts(&[user]).await.map_err(storage_failure)?;
        let buyer = locked
            .first()
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: user.to_string(),
            })?;

        if !buyer.can_afford(price) {
            tracing::debug!(
                user_id = %user,
                balance = buyer.balance,
                item = %item,
                price,
                "Purchase rejected: insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance {
                balance: buyer.balance,
                required: price,
            });
        }

        let balance = uow
            .adjust_balance(user, -price)
            .await
            .map_err(storage_failure)?;
        let entry = uow.grant_item(user, item).await.map_err(storage_failure)?;
        uow.commit().await.map_err(storage_failure)?;

        tracing::info!(
            user_id = %user,
            item = %item,
            price,
            new_balance = balance,
            "Item purchased"
        );

        Ok(entry)
    }
}
