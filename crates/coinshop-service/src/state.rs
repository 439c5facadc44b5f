//! Application state.

use std::sync::Arc;

use coinshop_core::Catalog;
use coinshop_ledger::{AccountQueryService, CredentialHasher, HashCost, LedgerEngine};
use coinshop_store::{LedgerStore, MemoryStore, PgStore, PoolSettings};

use crate::auth::{Authenticator, JwtAuthenticator};
use crate::config::{ServiceConfig, StorageBackend};
use crate::error::StartupError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Transfers, purchases and login.
    pub engine: LedgerEngine,

    /// Read-only account view.
    pub queries: AccountQueryService,

    /// Session token issuer and verifier.
    pub authenticator: Arc<dyn Authenticator>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        catalog: Catalog,
        hasher: CredentialHasher,
        authenticator: Arc<dyn Authenticator>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            engine: LedgerEngine::new(Arc::clone(&store), Arc::new(catalog), hasher),
            queries: AccountQueryService::new(store),
            authenticator,
            config,
        }
    }

    /// Build the state from configuration: open the store (connecting and
    /// migrating PostgreSQL when selected), load the catalog and set up
    /// password hashing and token signing.
    ///
    /// # Errors
    ///
    /// Returns `StartupError` if any dependency cannot be initialized.
    pub async fn from_config(config: ServiceConfig) -> Result<Self, StartupError> {
        let jwt_secret = config.jwt_secret()?;
        let authenticator = Arc::new(JwtAuthenticator::new(jwt_secret, config.token_ttl_seconds));

        let store: Arc<dyn LedgerStore> = match config.storage_backend {
            StorageBackend::Postgres => {
                let settings = PoolSettings {
                    max_connections: config.database_max_connections,
                    ..PoolSettings::default()
                };
                let store = PgStore::connect(config.database_url()?, &settings).await?;
                store.migrate().await?;
                tracing::info!("Database migrations applied");
                Arc::new(store)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage - data will be lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let catalog = match &config.items_path {
            Some(path) => {
                let catalog = Catalog::load(path)?;
                tracing::info!(path = %path, items = catalog.len(), "Loaded item catalog");
                catalog
            }
            None => {
                tracing::info!("Using built-in item catalog");
                Catalog::default()
            }
        };

        let hasher = match config.password_hash_memory_kib {
            Some(memory_kib) => CredentialHasher::new(HashCost {
                memory_kib,
                ..HashCost::default()
            })?,
            None => CredentialHasher::default(),
        };

        Ok(Self::new(store, catalog, hasher, authenticator, config))
    }
}
