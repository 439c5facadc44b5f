//! Read-only account aggregation.

use std::sync::Arc;

use coinshop_core::{AccountInfo, LedgerError, Result, UserId};
use coinshop_store::LedgerStore;

use crate::engine::storage_failure;

/// Balance, history and inventory lookups for one account.
#[derive(Clone)]
pub struct AccountQueryService {
    store: Arc<dyn LedgerStore>,
}

impl AccountQueryService {
    /// Create a query service over a store.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Gather the account's balance, sent and received transfers, and
    /// inventory counts.
    ///
    /// The three sub-queries run concurrently. A failure in any of them fails
    /// the whole call; partial results are never returned.
    ///
    /// # Errors
    ///
    /// - `LedgerError::AccountNotFound` if the account does not exist.
    /// - `LedgerError::Storage` if any lookup fails.
    pub async fn account_info(&self, user: UserId) -> Result<AccountInfo> {
        let account = self
            .store
            .find_account_by_id(user)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: user.to_string(),
            })?;

        let (sent, received, inventory) = tokio::try_join!(
            self.store.transfers_sent_by(&account.username),
            self.store.transfers_received_by(&account.username),
            self.store.inventory_of(user),
        )
        .map_err(storage_failure)?;

        tracing::debug!(
            user_id = %user,
            sent = sent.len(),
            received = received.len(),
            "Account info assembled"
        );

        Ok(AccountInfo {
            coins: account.balance,
            sent: sent.into_iter().map(Into::into).collect(),
            received: received.into_iter().map(Into::into).collect(),
            inventory,
        })
    }
}
