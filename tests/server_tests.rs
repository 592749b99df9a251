//! End-to-end tests over a spawned HTTP server: the authorization endpoint
//! contract, the REST face over the router, and the HTTP oracle reading the
//! endpoint's answers.

mod common;

use std::sync::Arc;

use common::RecordingStore;
use makan_where::adapters::LocalStore;
use makan_where::config::AllowList;
use makan_where::custom_config::CustomConfigStore;
use makan_where::oracle::{AllowListOracle, AuthorizationOracle, HttpOracle};
use makan_where::router::StorageRouter;
use makan_where::server::{AppState, app};
use makan_where::storage::MemoryStringStore;
use serde_json::{Value, json};

/// Spawn the app with a memory-backed local tier and the given allow-list;
/// unauthorized organizations land on local storage.
async fn spawn_app(allow_list: &str) -> String {
    let allow_list = AllowList::parse(allow_list);
    let string_store = Arc::new(MemoryStringStore::new());

    let router = StorageRouter::new(
        Arc::new(RecordingStore::new()),
        LocalStore::new(string_store.clone()),
        CustomConfigStore::new(string_store),
        common::failing_custom_factory(),
        Arc::new(AllowListOracle::new(allow_list.clone())),
    );

    let state = AppState {
        router: Arc::new(router),
        allow_list,
        table: "restaurants".to_string(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });

    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Authorization endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auth_endpoint_authorizes_allow_listed_names() {
    let base = spawn_app("globex, initech").await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/api/auth"))
        .json(&json!({ "username": "  GLOBEX " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["isAuthorized"], true);
    assert_eq!(body["username"], "globex");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn auth_endpoint_denies_unknown_names() {
    let base = spawn_app("globex").await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/api/auth"))
        .json(&json!({ "username": "acme corp" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["isAuthorized"], false);
    assert_eq!(body["username"], "acme corp");
}

#[tokio::test]
async fn auth_endpoint_requires_a_username() {
    let base = spawn_app("globex").await;
    let client = reqwest::Client::new();

    for payload in [json!({}), json!({ "username": "" }), json!({ "username": 7 })] {
        let response = client
            .post(format!("{base}/api/auth"))
            .json(&payload)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Username is required");
    }
}

#[tokio::test]
async fn auth_endpoint_rejects_get() {
    let base = spawn_app("globex").await;

    let response = reqwest::get(format!("{base}/api/auth")).await.unwrap();
    assert_eq!(response.status(), 405);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn http_oracle_reads_endpoint_answers_and_fails_closed() {
    let base = spawn_app("globex").await;

    let oracle = HttpOracle::new(format!("{base}/api/auth"));
    assert!(oracle.is_authorized("globex").await);
    assert!(!oracle.is_authorized("acme corp").await);

    // a blank name gets the endpoint's 400, which must read as "no"
    assert!(!oracle.is_authorized("   ").await);
}

// ---------------------------------------------------------------------------
// Restaurant CRUD over HTTP (unauthorized organization, local tier)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restaurant_crud_round_trip() {
    let base = spawn_app("globex").await;
    let client = reqwest::Client::new();

    // add
    let response = client
        .post(format!("{base}/restaurants"))
        .query(&[("org", "acme corp")])
        .json(&json!({
            "name": "Pho Co",
            "cuisine": "Vietnamese",
            "priceRange": "$$",
            "isHalal": false
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let added: Value = response.json().await.unwrap();
    let id = added["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(added["orgName"], "acme corp");

    // list
    let listed: Value = client
        .get(format!("{base}/restaurants"))
        .query(&[("org", "acme corp")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0], added);

    // update
    let updated: Value = client
        .put(format!("{base}/restaurants/{id}"))
        .query(&[("org", "acme corp")])
        .json(&json!({
            "name": "Pho Delight",
            "cuisine": "Vietnamese",
            "priceRange": "$",
            "isHalal": false
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["name"], "Pho Delight");
    assert_eq!(updated["priceRange"], "$");

    // delete, twice: the second is still a success
    for _ in 0..2 {
        let response = client
            .delete(format!("{base}/restaurants/{id}"))
            .query(&[("org", "acme corp")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 204);
    }

    let listed: Value = client
        .get(format!("{base}/restaurants"))
        .query(&[("org", "acme corp")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_of_missing_restaurant_is_404() {
    let base = spawn_app("globex").await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{base}/restaurants/nope"))
        .query(&[("org", "acme corp")])
        .json(&json!({
            "name": "Ghost Kitchen",
            "cuisine": "Fusion",
            "priceRange": "$$",
            "isHalal": false
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Restaurant not found");
}

#[tokio::test]
async fn missing_org_query_is_400() {
    let base = spawn_app("globex").await;

    let response = reqwest::get(format!("{base}/restaurants")).await.unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation error: Organization name is required");
}

// ---------------------------------------------------------------------------
// Custom config endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn custom_config_status_defaults_to_absent() {
    let base = spawn_app("globex").await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{base}/custom-config"))
        .query(&[("org", "acme corp")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["hasConfig"], false);

    // removing a config that was never saved is still a success
    let response = client
        .delete(format!("{base}/custom-config"))
        .query(&[("org", "acme corp")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn custom_config_rejects_blank_fields() {
    let base = spawn_app("globex").await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/custom-config"))
        .query(&[("org", "acme corp")])
        .json(&json!({ "url": " ", "key": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Validation error: Please fill in both URL and API key"
    );
}
