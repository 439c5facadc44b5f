//! Balance-transfer and purchase engine for coinshop.
//!
//! - [`LedgerEngine`]: registration-or-login, coin transfers, item purchases
//! - [`AccountQueryService`]: read-only balance, history and inventory view
//! - [`CredentialHasher`]: argon2id password hashing
//!
//! Both services depend only on the [`coinshop_store::LedgerStore`] trait and
//! hold no state of their own between calls; cloning them is cheap.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use coinshop_core::Catalog;
//! use coinshop_ledger::{AccountQueryService, CredentialHasher, LedgerEngine};
//! use coinshop_store::MemoryStore;
//!
//! # async fn example() -> coinshop_core::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let engine = LedgerEngine::new(
//!     store.clone(),
//!     Arc::new(Catalog::default()),
//!     CredentialHasher::default(),
//! );
//! let queries = AccountQueryService::new(store);
//!
//! let alice = engine.authenticate("alice", "password").await?;
//! engine.authenticate("bob", "password").await?;
//! engine.transfer_coins(alice, "bob", 100).await?;
//! engine.buy_item(alice, "book").await?;
//!
//! let info = queries.account_info(alice).await?;
//! assert_eq!(info.coins, 850);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod credentials;
pub mod engine;
pub mod query;

pub use credentials::{CredentialHasher, HashCost};
pub use engine::LedgerEngine;
pub use query::AccountQueryService;
