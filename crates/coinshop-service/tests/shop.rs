//! Purchase integration tests.

mod common;

use common::{bearer, TestHarness};

#[tokio::test]
async fn buying_debits_price_and_adds_inventory() {
    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;

    let response = harness
        .server
        .get("/api/buy/book")
        .add_header("authorization", bearer(&token))
        .await;
    response.assert_status_ok();
    assert!(response.text().is_empty());

    let info = harness.info(&token).await;
    assert_eq!(info["coins"], 950);
    assert_eq!(info["inventory"][0]["type"], "book");
    assert_eq!(info["inventory"][0]["quantity"], 1);
}

#[tokio::test]
async fn repeated_purchases_aggregate() {
    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;

    for item in ["cup", "cup", "pen"] {
        harness
            .server
            .get(&format!("/api/buy/{item}"))
            .add_header("authorization", bearer(&token))
            .await
            .assert_status_ok();
    }

    let info = harness.info(&token).await;
    assert_eq!(info["coins"], 1000 - 20 - 20 - 10);
    let inventory = info["inventory"].as_array().unwrap();
    assert_eq!(inventory.len(), 2);
    assert!(inventory.contains(&serde_json::json!({ "type": "cup", "quantity": 2 })));
    assert!(inventory.contains(&serde_json::json!({ "type": "pen", "quantity": 1 })));
}

#[tokio::test]
async fn unknown_item_is_rejected_without_charge() {
    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;

    let response = harness
        .server
        .get("/api/buy/yacht")
        .add_header("authorization", bearer(&token))
        .await;
    response.assert_status_bad_request();

    assert_eq!(harness.coins(&token).await, 1000);
    assert_eq!(harness.store.inventory_count().await, 0);
}

#[tokio::test]
async fn unaffordable_item_is_rejected_without_charge() {
    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;

    // 1000 coins buy two pink hoodies; the third must fail.
    for _ in 0..2 {
        harness
            .server
            .get("/api/buy/pink-hoody")
            .add_header("authorization", bearer(&token))
            .await
            .assert_status_ok();
    }
    let response = harness
        .server
        .get("/api/buy/pink-hoody")
        .add_header("authorization", bearer(&token))
        .await;
    response.assert_status_bad_request();

    let info = harness.info(&token).await;
    assert_eq!(info["coins"], 0);
    assert_eq!(info["inventory"][0]["quantity"], 2);
}

#[tokio::test]
async fn empty_item_is_a_bad_request() {
    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;

    harness
        .server
        .get("/api/buy/")
        .add_header("authorization", bearer(&token))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn storage_failure_is_an_opaque_500() {
    use coinshop_store::FaultPoint;

    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;
    harness.store.fail_next(FaultPoint::GrantItem).await;

    let response = harness
        .server
        .get("/api/buy/cup")
        .add_header("authorization", bearer(&token))
        .await;

    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errors"], "An internal error occurred");
    assert_eq!(harness.coins(&token).await, 1000);
}
