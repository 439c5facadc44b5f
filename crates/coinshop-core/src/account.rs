//! Account types for coinshop.
//!
//! An account is a username, a salted credential hash and an integer coin
//! balance. Accounts are created on the first successful login of an unknown
//! username and are only mutated by transfers and purchases.

use std::fmt;

use serde::Serialize;

use crate::UserId;

/// Coins granted to every account at auto-registration.
pub const STARTING_BALANCE: i64 = 1000;

/// A coin account.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Store-assigned identifier.
    pub id: UserId,

    /// Unique login name, immutable after creation.
    pub username: String,

    /// Salted password hash (PHC string). Never leaves the service.
    #[serde(skip)]
    pub password_hash: String,

    /// Current coin balance. Never negative.
    pub balance: i64,
}

impl Account {
    /// Check if the account can pay `amount` without going negative.
    #[must_use]
    pub fn can_afford(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("balance", &self.balance)
            .finish()
    }
}

/// Insert payload for a new account; the store assigns the id.
#[derive(Clone)]
pub struct NewAccount {
    /// Login name.
    pub username: String,
    /// Salted password hash.
    pub password_hash: String,
    /// Opening balance.
    pub balance: i64,
}

impl NewAccount {
    /// Build an auto-registration payload with the starting balance.
    #[must_use]
    pub fn registration(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            balance: STARTING_BALANCE,
        }
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish_non_exhaustive()
    }
}
