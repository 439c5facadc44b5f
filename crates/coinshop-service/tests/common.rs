//! Common test utilities for coinshop integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};

use coinshop_core::Catalog;
use coinshop_ledger::{CredentialHasher, HashCost};
use coinshop_service::{create_router, AppState, JwtAuthenticator, ServiceConfig, StorageBackend};
use coinshop_store::MemoryStore;

/// Signing secret used by the harness.
pub const JWT_SECRET: &str = "test-jwt-secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The backing store, for asserting on state the API does not expose.
    pub store: MemoryStore,
}

impl TestHarness {
    /// Create a new test harness with an empty in-memory store.
    pub fn new() -> Self {
        let store = MemoryStore::new();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            storage_backend: StorageBackend::Memory,
            jwt_secret: Some(JWT_SECRET.into()),
            ..ServiceConfig::default()
        };

        // Minimum argon2 cost keeps registration fast in tests.
        let hasher = CredentialHasher::new(HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to create hasher");

        let state = AppState::new(
            Arc::new(store.clone()),
            Catalog::default(),
            hasher,
            Arc::new(JwtAuthenticator::new(JWT_SECRET, config.token_ttl_seconds)),
            config,
        );
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Log in (registering on first use) and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/auth")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["token"]
            .as_str()
            .expect("token missing from auth response")
            .to_string()
    }

    /// Fetch `/api/info` for a token.
    pub async fn info(&self, token: &str) -> Value {
        let response = self
            .server
            .get("/api/info")
            .add_header("authorization", bearer(token))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Current balance for a token.
    pub async fn coins(&self, token: &str) -> i64 {
        self.info(token).await["coins"]
            .as_i64()
            .expect("coins missing from info response")
    }
}

/// `Authorization` header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
