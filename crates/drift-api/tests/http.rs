use std::net::SocketAddr;
use std::sync::Arc;

use drift_api::{AppStateInner, router};
use drift_db::Database;
use drift_gen::Generator;
use reqwest::StatusCode;

/// Bind an ephemeral port and serve the full router against a seeded
/// in-memory store and a network-free generator.
async fn spawn_server() -> SocketAddr {
    let db = Database::open_in_memory().unwrap();
    db.seed_demo().unwrap();

    let state = Arc::new(AppStateInner {
        db,
        generator: Generator::disabled(),
    });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn public_gallery_ordered_by_likes() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let gallery: serde_json::Value = client
        .get(format!("http://{}/api/postcards/public", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let cards = gallery.as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["likes"], 87);
    assert_eq!(cards[0]["userId"], 2);
    assert_eq!(cards[1]["likes"], 42);
    assert_eq!(cards[1]["userId"], 1);

    let top: serde_json::Value = client
        .get(format!("http://{}/api/postcards/public?limit=1", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(top.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn record_returns_created_postcard() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/api/record", addr))
        .json(&serde_json::json!({
            "userId": 1,
            "audioData": "c29tZSBiYXNlNjQgYXVkaW8="
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let postcard: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(postcard["userId"], 1);
    assert_eq!(postcard["likes"], 0);
    assert_eq!(postcard["isPublic"], 1);
    assert!(!postcard["caption"].as_str().unwrap().is_empty());
    assert!(!postcard["imgURL"].as_str().unwrap().is_empty());
    assert!(postcard["createdAt"].is_string());

    // The new card now shows up in the owner's inbox, newest first.
    let owned: serde_json::Value = client
        .get(format!("http://{}/api/postcards?userId=1", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let owned = owned.as_array().unwrap();
    assert_eq!(owned.len(), 2);
    assert_eq!(owned[0]["id"], postcard["id"]);
}

#[tokio::test]
async fn record_rejects_bad_requests() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    // Missing fields
    let resp = client
        .post(format!("http://{}/api/record", addr))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown user
    let resp = client
        .post(format!("http://{}/api/record", addr))
        .json(&serde_json::json!({ "userId": 999, "audioData": "YQ==" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Empty payload
    let resp = client
        .post(format!("http://{}/api/record", addr))
        .json(&serde_json::json!({ "userId": 1, "audioData": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn like_increments_and_404s_on_missing() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let liked: serde_json::Value = client
        .post(format!("http://{}/api/postcards/1/like", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(liked["likes"], 43);

    let resp = client
        .post(format!("http://{}/api/postcards/999/like", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn single_postcard_lookup() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{}/api/postcards/2", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let card: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(card["id"], 2);
    assert_eq!(card["userId"], 2);

    let resp = client
        .get(format!("http://{}/api/postcards/999", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Non-numeric id never reaches the store
    let resp = client
        .get(format!("http://{}/api/postcards/abc", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owned_listing_requires_a_valid_user_id() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{}/api/postcards?userId=oops", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("http://{}/api/postcards", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trade_candidates_never_include_own_postcards() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    for _ in 0..5 {
        let candidates: serde_json::Value = client
            .get(format!("http://{}/api/postcards/trade/1?count=5", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let candidates = candidates.as_array().unwrap();
        assert_eq!(candidates.len(), 1);
        for card in candidates {
            assert_ne!(card["userId"], 1);
            assert_eq!(card["isPublic"], 1);
        }
    }
}

#[tokio::test]
async fn trade_lifecycle() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/api/trades", addr))
        .json(&serde_json::json!({ "fromId": 1, "toId": 2, "postcardId": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let trade: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(trade["fromId"], 1);
    assert_eq!(trade["toId"], 2);
    assert_eq!(trade["postcardId"], 2);

    // A collect uses the market sentinel as its origin.
    let resp = client
        .post(format!("http://{}/api/trades", addr))
        .json(&serde_json::json!({ "fromId": 0, "toId": 1, "postcardId": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let trades: serde_json::Value = client
        .get(format!("http://{}/api/trades/1", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(trades.as_array().unwrap().len(), 2);

    let trades: serde_json::Value = client
        .get(format!("http://{}/api/trades/2", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(trades.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn trade_preconditions_enforced() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    // Self-trade
    let resp = client
        .post(format!("http://{}/api/trades", addr))
        .json(&serde_json::json!({ "fromId": 1, "toId": 1, "postcardId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Postcard does not exist
    let resp = client
        .post(format!("http://{}/api/trades", addr))
        .json(&serde_json::json!({ "fromId": 1, "toId": 2, "postcardId": 999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Recipient does not exist
    let resp = client
        .post(format!("http://{}/api/trades", addr))
        .json(&serde_json::json!({ "fromId": 1, "toId": 999, "postcardId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Malformed shape
    let resp = client
        .post(format!("http://{}/api/trades", addr))
        .json(&serde_json::json!({ "fromId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_and_user_lookup() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/api/users", addr))
        .json(&serde_json::json!({ "username": "luna", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(user["id"], 3);
    assert_eq!(user["username"], "luna");
    assert_eq!(user["timezone"], "UTC");
    assert!(user["lastSleepAt"].is_null());
    // The credential must never be serialized.
    assert!(user.get("password").is_none());

    // Duplicate username
    let resp = client
        .post(format!("http://{}/api/users", addr))
        .json(&serde_json::json!({ "username": "luna", "password": "other" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .get(format!("http://{}/api/users/3", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("http://{}/api/users/999", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
