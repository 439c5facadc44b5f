//! In-memory storage implementation.
//!
//! `MemoryStore` honours the same unit-of-work contract as [`crate::PgStore`]:
//! each account row sits behind its own async mutex, a unit of work holds the
//! row guards it locked until it commits or is dropped, and staged writes are
//! applied at commit while those guards are still held. Readers take the row
//! mutex too, so they observe either the pre- or post-commit balance.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use coinshop_core::{
    Account, InventoryEntry, InventoryEntryId, NewAccount, NewTransfer, TransferId,
    TransferRecord, UserId,
};

use crate::error::{Result, StoreError};
use crate::{AccountStore, HistoryStore, InventoryStore, LedgerStore, UnitOfWork};

/// A write step that can be made to fail once, for exercising rollback paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// `UnitOfWork::adjust_balance`.
    AdjustBalance,
    /// `UnitOfWork::append_transfer`.
    AppendTransfer,
    /// `UnitOfWork::grant_item`.
    GrantItem,
    /// `UnitOfWork::commit`.
    Commit,
    /// `HistoryStore` reads.
    ReadHistory,
    /// `InventoryStore` reads.
    ReadInventory,
}

#[derive(Default)]
struct Tables {
    accounts: RwLock<BTreeMap<UserId, Arc<Mutex<Account>>>>,
    usernames: Mutex<HashMap<String, UserId>>,
    history: RwLock<Vec<TransferRecord>>,
    inventory: RwLock<Vec<InventoryEntry>>,
    next_user_id: AtomicI64,
    next_transfer_id: AtomicI64,
    next_inventory_id: AtomicI64,
    faults: Mutex<HashSet<FaultPoint>>,
}

impl Tables {
    fn allocate(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn check_fault(&self, point: FaultPoint) -> Result<()> {
        if self.faults.lock().await.remove(&point) {
            return Err(StoreError::Database(format!("injected fault at {point:?}")));
        }
        Ok(())
    }

    async fn row(&self, id: UserId) -> Option<Arc<Mutex<Account>>> {
        self.accounts.read().await.get(&id).cloned()
    }
}

/// In-memory storage implementation.
///
/// Cloning is cheap and every clone shares the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next operation at `point` fail with a storage error.
    pub async fn fail_next(&self, point: FaultPoint) {
        self.tables.faults.lock().await.insert(point);
    }

    /// Number of stored transfer records.
    pub async fn transfer_count(&self) -> usize {
        self.tables.history.read().await.len()
    }

    /// Number of stored inventory rows.
    pub async fn inventory_count(&self) -> usize {
        self.tables.inventory.read().await.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        let mut usernames = self.tables.usernames.lock().await;
        if usernames.contains_key(&account.username) {
            return Err(StoreError::UsernameTaken {
                username: account.username,
            });
        }

        let id = UserId::new(Tables::allocate(&self.tables.next_user_id));
        let stored = Account {
            id,
            username: account.username,
            password_hash: account.password_hash,
            balance: account.balance,
        };

        self.tables
            .accounts
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(stored.clone())));
        usernames.insert(stored.username.clone(), id);

        Ok(stored)
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let id = self.tables.usernames.lock().await.get(username).copied();
        match id {
            Some(id) => self.find_account_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn find_account_by_id(&self, id: UserId) -> Result<Option<Account>> {
        let Some(row) = self.tables.row(id).await else {
            return Ok(None);
        };
        let account = row.lock().await.clone();
        Ok(Some(account))
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn transfers_sent_by(&self, username: &str) -> Result<Vec<TransferRecord>> {
        self.tables.check_fault(FaultPoint::ReadHistory).await?;
        Ok(self
            .tables
            .history
            .read()
            .await
            .iter()
            .filter(|record| record.sender == username)
            .cloned()
            .collect())
    }

    async fn transfers_received_by(&self, username: &str) -> Result<Vec<TransferRecord>> {
        self.tables.check_fault(FaultPoint::ReadHistory).await?;
        Ok(self
            .tables
            .history
            .read()
            .await
            .iter()
            .filter(|record| record.receiver == username)
            .cloned()
            .collect())
    }

    async fn delete_transfer(&self, id: TransferId) -> Result<()> {
        let mut history = self.tables.history.write().await;
        let before = history.len();
        history.retain(|record| record.id != id);
        if history.len() == before {
            return Err(StoreError::NotFound {
                entity: "transfer",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn inventory_of(&self, owner: UserId) -> Result<BTreeMap<String, u64>> {
        self.tables.check_fault(FaultPoint::ReadInventory).await?;
        let mut counts = BTreeMap::new();
        for entry in self.tables.inventory.read().await.iter() {
            if entry.owner_id == owner {
                *counts.entry(entry.item.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn delete_inventory_entry(&self, id: InventoryEntryId) -> Result<()> {
        let mut inventory = self.tables.inventory.write().await;
        let before = inventory.len();
        inventory.retain(|entry| entry.id != id);
        if inventory.len() == before {
            return Err(StoreError::NotFound {
                entity: "inventory entry",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            rows: BTreeMap::new(),
            balances: BTreeMap::new(),
            transfers: Vec::new(),
            grants: Vec::new(),
        }))
    }
}

/// Staged writes plus the row guards that protect them.
struct MemoryUnitOfWork {
    tables: Arc<Tables>,
    rows: BTreeMap<UserId, OwnedMutexGuard<Account>>,
    balances: BTreeMap<UserId, i64>,
    transfers: Vec<TransferRecord>,
    grants: Vec<InventoryEntry>,
}

impl MemoryUnitOfWork {
    fn current(&self, id: UserId) -> Option<Account> {
        let guard = self.rows.get(&id)?;
        let mut account = Account::clone(guard);
        if let Some(balance) = self.balances.get(&id) {
            account.balance = *balance;
        }
        Some(account)
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_accounts(&mut self, ids: &[UserId]) -> Result<Vec<Account>> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        for id in &ids {
            if self.rows.contains_key(id) {
                continue;
            }
            if let Some(row) = self.tables.row(*id).await {
                let guard = row.lock_owned().await;
                self.rows.insert(*id, guard);
            }
        }

        Ok(ids.into_iter().filter_map(|id| self.current(id)).collect())
    }

    async fn adjust_balance(&mut self, id: UserId, delta: i64) -> Result<i64> {
        self.tables.check_fault(FaultPoint::AdjustBalance).await?;
        let current = self
            .current(id)
            .ok_or_else(|| StoreError::NotLocked { id: id.to_string() })?;

        let balance = current.balance + delta;
        if balance < 0 {
            return Err(StoreError::Database(format!(
                "balance check violated for account {id}"
            )));
        }
        self.balances.insert(id, balance);
        Ok(balance)
    }

    async fn append_transfer(&mut self, transfer: NewTransfer) -> Result<TransferRecord> {
        self.tables.check_fault(FaultPoint::AppendTransfer).await?;
        let id = TransferId::new(Tables::allocate(&self.tables.next_transfer_id));
        let record = transfer.into_record(id);
        self.transfers.push(record.clone());
        Ok(record)
    }

    async fn grant_item(&mut self, owner: UserId, item: &str) -> Result<InventoryEntry> {
        self.tables.check_fault(FaultPoint::GrantItem).await?;
        let entry = InventoryEntry {
            id: InventoryEntryId::new(Tables::allocate(&self.tables.next_inventory_id)),
            owner_id: owner,
            item: item.to_string(),
        };
        self.grants.push(entry.clone());
        Ok(entry)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tables.check_fault(FaultPoint::Commit).await?;
        let MemoryUnitOfWork {
            tables,
            mut rows,
            balances,
            transfers,
            grants,
        } = *self;

        // Every await happens before the first write: a commit cancelled
        // while waiting on a table lock leaves nothing applied.
        let mut history = tables.history.write().await;
        let mut inventory = tables.inventory.write().await;

        for (id, balance) in balances {
            if let Some(guard) = rows.get_mut(&id) {
                guard.balance = balance;
            }
        }
        history.extend(transfers);
        inventory.extend(grants);

        drop(inventory);
        drop(history);

        // Row guards drop here, after every table reflects the commit.
        drop(rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(balances: &[(&str, i64)]) -> (MemoryStore, Vec<Account>) {
        let store = MemoryStore::new();
        let mut accounts = Vec::new();
        for (name, balance) in balances {
            let account = store
                .insert_account(NewAccount {
                    username: (*name).to_string(),
                    password_hash: "hash".into(),
                    balance: *balance,
                })
                .await
                .unwrap();
            accounts.push(account);
        }
        (store, accounts)
    }

    fn transfer(sender: &str, receiver: &str, amount: i64) -> NewTransfer {
        NewTransfer {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }

    #[tokio::test]
    async fn account_insert_and_lookup() {
        let (store, accounts) = store_with(&[("alice", 1000)]).await;
        let alice = &accounts[0];

        let by_name = store.find_account_by_username("alice").await.unwrap();
        assert_eq!(by_name.as_ref(), Some(alice));

        let by_id = store.find_account_by_id(alice.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(alice));

        assert!(store.find_account_by_username("bob").await.unwrap().is_none());
        assert!(store.find_account_by_id(UserId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (store, _) = store_with(&[("alice", 1000)]).await;

        let result = store
            .insert_account(NewAccount::registration("alice", "other"))
            .await;
        assert!(matches!(result, Err(StoreError::UsernameTaken { .. })));
    }

    #[tokio::test]
    async fn committed_unit_of_work_applies_everything() {
        let (store, accounts) = store_with(&[("alice", 1000), ("bob", 0)]).await;
        let (alice, bob) = (accounts[0].id, accounts[1].id);

        let mut uow = store.begin().await.unwrap();
        let locked = uow.lock_accounts(&[bob, alice]).await.unwrap();
        assert_eq!(locked.iter().map(|a| a.id).collect::<Vec<_>>(), vec![alice, bob]);

        assert_eq!(uow.adjust_balance(alice, -300).await.unwrap(), 700);
        assert_eq!(uow.adjust_balance(bob, 300).await.unwrap(), 300);
        uow.append_transfer(transfer("alice", "bob", 300)).await.unwrap();
        uow.grant_item(alice, "cup").await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(store.find_account_by_id(alice).await.unwrap().unwrap().balance, 700);
        assert_eq!(store.find_account_by_id(bob).await.unwrap().unwrap().balance, 300);
        assert_eq!(store.transfers_sent_by("alice").await.unwrap().len(), 1);
        assert_eq!(store.transfers_received_by("bob").await.unwrap().len(), 1);
        assert_eq!(store.inventory_of(alice).await.unwrap().get("cup"), Some(&1));
    }

    #[tokio::test]
    async fn dropped_unit_of_work_rolls_back() {
        let (store, accounts) = store_with(&[("alice", 1000), ("bob", 0)]).await;
        let (alice, bob) = (accounts[0].id, accounts[1].id);

        {
            let mut uow = store.begin().await.unwrap();
            uow.lock_accounts(&[alice, bob]).await.unwrap();
            uow.adjust_balance(alice, -500).await.unwrap();
            uow.adjust_balance(bob, 500).await.unwrap();
            uow.append_transfer(transfer("alice", "bob", 500)).await.unwrap();
        }

        assert_eq!(store.find_account_by_id(alice).await.unwrap().unwrap().balance, 1000);
        assert_eq!(store.find_account_by_id(bob).await.unwrap().unwrap().balance, 0);
        assert_eq!(store.transfer_count().await, 0);
    }

    #[tokio::test]
    async fn adjusting_an_unlocked_row_fails() {
        let (store, accounts) = store_with(&[("alice", 1000)]).await;

        let mut uow = store.begin().await.unwrap();
        let result = uow.adjust_balance(accounts[0].id, -1).await;
        assert!(matches!(result, Err(StoreError::NotLocked { .. })));
    }

    #[tokio::test]
    async fn balance_cannot_go_negative() {
        let (store, accounts) = store_with(&[("alice", 10)]).await;
        let alice = accounts[0].id;

        let mut uow = store.begin().await.unwrap();
        uow.lock_accounts(&[alice]).await.unwrap();
        assert!(matches!(
            uow.adjust_balance(alice, -11).await,
            Err(StoreError::Database(_))
        ));
    }

    #[tokio::test]
    async fn missing_rows_are_absent_from_lock_result() {
        let (store, accounts) = store_with(&[("alice", 10)]).await;

        let mut uow = store.begin().await.unwrap();
        let locked = uow
            .lock_accounts(&[accounts[0].id, UserId::new(404)])
            .await
            .unwrap();
        assert_eq!(locked.len(), 1);
    }

    #[tokio::test]
    async fn injected_commit_fault_applies_nothing() {
        let (store, accounts) = store_with(&[("alice", 100)]).await;
        let alice = accounts[0].id;
        store.fail_next(FaultPoint::Commit).await;

        let mut uow = store.begin().await.unwrap();
        uow.lock_accounts(&[alice]).await.unwrap();
        uow.adjust_balance(alice, -50).await.unwrap();
        uow.grant_item(alice, "book").await.unwrap();
        assert!(uow.commit().await.is_err());

        assert_eq!(store.find_account_by_id(alice).await.unwrap().unwrap().balance, 100);
        assert_eq!(store.inventory_count().await, 0);
    }

    #[tokio::test]
    async fn faults_fire_once() {
        let (store, _) = store_with(&[("alice", 100)]).await;
        store.fail_next(FaultPoint::ReadHistory).await;

        assert!(store.transfers_sent_by("alice").await.is_err());
        assert!(store.transfers_sent_by("alice").await.is_ok());
    }

    #[tokio::test]
    async fn cleanup_deletes_rows() {
        let (store, accounts) = store_with(&[("alice", 100), ("bob", 0)]).await;
        let (alice, bob) = (accounts[0].id, accounts[1].id);

        let mut uow = store.begin().await.unwrap();
        uow.lock_accounts(&[alice, bob]).await.unwrap();
        let record = uow.append_transfer(transfer("alice", "bob", 1)).await.unwrap();
        let entry = uow.grant_item(alice, "pen").await.unwrap();
        uow.commit().await.unwrap();

        store.delete_transfer(record.id).await.unwrap();
        store.delete_inventory_entry(entry.id).await.unwrap();
        assert_eq!(store.transfer_count().await, 0);
        assert!(store.inventory_of(alice).await.unwrap().is_empty());

        assert!(matches!(
            store.delete_transfer(record.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn second_unit_of_work_waits_for_row_lock() {
        let (store, accounts) = store_with(&[("alice", 100)]).await;
        let alice = accounts[0].id;

        let mut first = store.begin().await.unwrap();
        first.lock_accounts(&[alice]).await.unwrap();
        first.adjust_balance(alice, -100).await.unwrap();

        let contender = {
            let store = store.clone();
            tokio::spawn(async move {
                let mut second = store.begin().await.unwrap();
                let locked = second.lock_accounts(&[alice]).await.unwrap();
                locked[0].balance
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        first.commit().await.unwrap();
        assert_eq!(contender.await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn cancelled_commit_applies_nothing() {
        let (store, accounts) = store_with(&[("alice", 1000), ("bob", 1000)]).await;
        let (alice, bob) = (accounts[0].id, accounts[1].id);

        // A reader parks the commit on the history table lock.
        let reader = store.tables.history.read().await;

        let transfer_task = {
            let store = store.clone();
            tokio::spawn(async move {
                let mut uow = store.begin().await.unwrap();
                uow.lock_accounts(&[alice, bob]).await.unwrap();
                uow.adjust_balance(alice, -100).await.unwrap();
                uow.adjust_balance(bob, 100).await.unwrap();
                uow.append_transfer(transfer("alice", "bob", 100)).await.unwrap();
                uow.commit().await.unwrap();
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!transfer_task.is_finished());
        transfer_task.abort();
        assert!(transfer_task.await.unwrap_err().is_cancelled());
        drop(reader);

        assert_eq!(store.find_account_by_id(alice).await.unwrap().unwrap().balance, 1000);
        assert_eq!(store.find_account_by_id(bob).await.unwrap().unwrap().balance, 1000);
        assert_eq!(store.transfer_count().await, 0);
    }
}
