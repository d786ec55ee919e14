//! Sync API integration tests
//!
//! Checksum handshake of the collection reads.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{recipe_body, TestApp};

#[tokio::test]
async fn test_first_read_returns_rows_and_checksum() {
    let app = TestApp::new();
    let token = app.writer("alice").await;
    app.post("/recipes", Some(&token)).json(&recipe_body("bread")).await;

    let response = app.get("/recipes", Some(&token)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(body["recipes"][0]["title"], "bread");
    assert!(body["checksum"].is_i64());
}

#[tokio::test]
async fn test_matching_checksum_answers_no_content() {
    let app = TestApp::new();
    let token = app.writer("alice").await;
    app.post("/recipes", Some(&token)).json(&recipe_body("bread")).await;

    let first = app.get("/recipes", Some(&token)).await.json::<Value>();
    let checksum = first["checksum"].as_i64().unwrap();

    let second = app
        .get(&format!("/recipes?checksum={}", checksum), Some(&token))
        .await;
    assert_eq!(second.status_code(), StatusCode::NO_CONTENT);
    assert!(second.text().is_empty());
}

#[tokio::test]
async fn test_change_after_checksum_returns_new_rows() {
    let app = TestApp::new();
    let token = app.writer("alice").await;
    app.post("/recipes", Some(&token)).json(&recipe_body("bread")).await;
    let checksum = app.get("/recipes", Some(&token)).await.json::<Value>()["checksum"]
        .as_i64()
        .unwrap();

    app.post("/recipes", Some(&token)).json(&recipe_body("cake")).await;

    let response = app
        .get(&format!("/recipes?checksum={}", checksum), Some(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["recipes"].as_array().unwrap().len(), 2);
    assert_ne!(body["checksum"].as_i64().unwrap(), checksum);
}

#[tokio::test]
async fn test_sentinel_checksum_always_returns_rows() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = app.get("/categories?checksum=-1", Some(&token)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["categories"], json!([]));
}

#[tokio::test]
async fn test_non_integer_checksum_is_rejected() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = app.get("/comments?checksum=abc", Some(&token)).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "checksum must be an integer");
}

#[tokio::test]
async fn test_sync_requires_session() {
    let app = TestApp::new();
    let response = app.get("/recipes", None).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_every_collection_uses_its_own_name() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    for name in ["recipes", "categories", "comments", "users"] {
        let response = app.get(&format!("/{}", name), Some(&token)).await;
        assert_eq!(response.status_code(), StatusCode::OK, "{}", name);
        assert!(response.json::<Value>()[name].is_array(), "{}", name);
    }
}

#[tokio::test]
async fn test_rows_are_scoped_to_the_group() {
    let app = TestApp::new();
    let (_, alice) = app.session_for("alice", false, Some(1)).await;
    let (_, bob) = app.session_for("bob", false, Some(1)).await;
    let (_, carol) = app.session_for("carol", false, None).await;

    app.post("/recipes", Some(&alice)).json(&recipe_body("shared bread")).await;
    app.post("/recipes", Some(&carol)).json(&recipe_body("own cake")).await;

    let bob_view = app.get("/recipes", Some(&bob)).await.json::<Value>();
    let titles: Vec<&str> = bob_view["recipes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|recipe| recipe["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["shared bread"]);

    let carol_view = app.get("/recipes", Some(&carol)).await.json::<Value>();
    assert_eq!(carol_view["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(carol_view["recipes"][0]["title"], "own cake");

    let users = app.get("/users", Some(&bob)).await.json::<Value>();
    let names: Vec<&str> = users["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["user"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);
}
