//! Account info integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn new_account_has_empty_history_and_inventory() {
    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;

    let info = harness.info(&token).await;

    assert_eq!(
        info,
        json!({
            "coins": 1000,
            "inventory": [],
            "coinHistory": { "received": [], "sent": [] }
        })
    );
}

#[tokio::test]
async fn unauthenticated_info_returns_no_data() {
    let harness = TestHarness::new();
    harness.login("alice", "password").await;

    let response = harness.server.get("/api/info").await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert!(body.get("coins").is_none());
    assert_eq!(body["errors"], "unauthorized");
}

#[tokio::test]
async fn history_lookup_failure_is_an_error_not_an_empty_list() {
    use coinshop_store::FaultPoint;

    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;
    harness.store.fail_next(FaultPoint::ReadHistory).await;

    let response = harness
        .server
        .get("/api/info")
        .add_header("authorization", common::bearer(&token))
        .await;

    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}
