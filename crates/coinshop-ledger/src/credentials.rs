//! Password hashing.
//!
//! Credentials are stored as argon2id PHC strings with a random per-account
//! salt. Hashing is CPU-bound, so both directions run on the blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use coinshop_core::{LedgerError, Result};

/// Cost parameters for new hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies account passwords.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher {
    /// Create a hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if argon2 rejects the parameters.
    pub fn new(cost: HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| LedgerError::Storage(format!("invalid hash parameters: {e}")))?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if hashing fails.
    pub async fn hash(&self, password: &str) -> Result<String> {
        let params = self.params.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| LedgerError::Storage(format!("password hashing failed: {e}")))
        })
        .await
        .map_err(|e| LedgerError::Storage(format!("hashing task failed: {e}")))?
    }

    /// Check a password against a stored PHC string.
    ///
    /// The cost parameters are read from the stored hash, so hashes written
    /// under older settings keep verifying.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the stored hash is unparsable.
    pub async fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        let password = password.to_owned();
        let stored = stored.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored)
                .map_err(|e| LedgerError::Storage(format!("malformed password hash: {e}")))?;
            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(LedgerError::Storage(format!(
                    "password verification failed: {e}"
                ))),
            }
        })
        .await
        .map_err(|e| LedgerError::Storage(format!("hashing task failed: {e}")))?
    }
}
