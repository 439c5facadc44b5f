//! Client tests against a mocked coinshop service.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coinshop_client::{ClientError, CoinShopClient};

async fn setup() -> (MockServer, CoinShopClient) {
    let server = MockServer::start().await;
    let client = CoinShopClient::new(&server.uri()).unwrap();
    (server, client)
}

#[tokio::test]
async fn authenticate_returns_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_json(json!({ "username": "alice", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt-token" })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client.authenticate("alice", "pw").await.unwrap();
    assert_eq!(token, "jwt-token");
}

#[tokio::test]
async fn wrong_password_maps_to_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "errors": "unauthorized" })),
        )
        .mount(&server)
        .await;

    let result = client.authenticate("alice", "wrong").await;
    assert!(matches!(result, Err(ClientError::Unauthorized)));
}

#[tokio::test]
async fn buy_item_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/buy/cup"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.buy_item("jwt-token", "cup").await.unwrap();
}

#[tokio::test]
async fn insufficient_balance_is_a_rejection() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/buy/pink-hoody"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": "insufficient balance: balance=100, required=500"
        })))
        .mount(&server)
        .await;

    let err = client.buy_item("jwt-token", "pink-hoody").await.unwrap_err();
    assert!(err.is_insufficient_balance());
    assert!(matches!(err, ClientError::Rejected { .. }));
}

#[tokio::test]
async fn send_coin_posts_camel_case_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/sendCoin"))
        .and(header("authorization", "Bearer jwt-token"))
        .and(body_json(json!({ "toUser": "bob", "amount": 100 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.send_coin("jwt-token", "bob", 100).await.unwrap();
}

#[tokio::test]
async fn info_parses_response() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coins": 830,
            "inventory": [{ "type": "cup", "quantity": 2 }],
            "coinHistory": {
                "received": [{ "fromUser": "bob", "amount": 30 }],
                "sent": [{ "toUser": "bob", "amount": 160 }]
            }
        })))
        .mount(&server)
        .await;

    let info = client.info("jwt-token").await.unwrap();
    assert_eq!(info.coins, 830);
    assert_eq!(info.quantity_of("cup"), 2);
    assert_eq!(info.quantity_of("pen"), 0);
    assert_eq!(info.coin_history.received[0].from_user, "bob");
    assert_eq!(info.coin_history.sent[0].amount, 160);
}

#[tokio::test]
async fn server_errors_keep_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/info"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "errors": "An internal error occurred" })),
        )
        .mount(&server)
        .await;

    let err = client.info("jwt-token").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 500, .. }));
}

#[tokio::test]
async fn non_json_error_body_still_maps() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client.health().await.unwrap_err();
    assert!(
        matches!(err, ClientError::Api { status: 503, ref message } if message.contains("503"))
    );
}

#[tokio::test]
async fn health_parses_response() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "service": "coinshop",
            "version": "0.1.0",
            "storage": "memory"
        })))
        .mount(&server)
        .await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.storage, "memory");
}
