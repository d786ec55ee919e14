//! Recipe book API integration tests
//!
//! Entity routes, group scoping and shared snapshots.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{recipe_body, TestApp};

#[tokio::test]
async fn test_recipe_lifecycle() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let created = app.post("/recipes", Some(&token)).json(&recipe_body("bread")).await;
    assert_eq!(created.status_code(), StatusCode::OK);
    let created = created.json::<Value>();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["title"], "bread");
    assert_eq!(created["image"], "");
    let uri = format!("/recipes/{}", id);

    let fetched = app.get(&uri, Some(&token)).await.json::<Value>();
    assert_eq!(fetched["title"], "bread");

    let updated = app.put(&uri, Some(&token)).json(&recipe_body("rye bread")).await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&token)).await.json::<Value>()["title"], "rye bread");

    let deleted = app.delete(&uri, Some(&token)).await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, Some(&token)).await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_field_names_it() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = app
        .post("/recipes", Some(&token))
        .json(&json!({"title": "bread", "categoryId": 1, "ingredients": "flour"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "No description provided");
}

#[tokio::test]
async fn test_read_only_user_cannot_write() {
    let app = TestApp::new();
    let (_, token) = app.session_for("guest", true, None).await;

    let response = app.post("/recipes", Some(&token)).json(&recipe_body("bread")).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let status = app.get("/status", Some(&token)).await;
    assert_eq!(status.json::<Value>(), json!({"username": "guest", "write": false}));
}

#[tokio::test]
async fn test_rows_outside_the_group_are_not_found() {
    let app = TestApp::new();
    let (_, alice) = app.session_for("alice", false, Some(1)).await;
    let (_, bob) = app.session_for("bob", false, Some(1)).await;
    let (_, mallory) = app.session_for("mallory", false, Some(2)).await;

    let id = app
        .post("/recipes", Some(&alice))
        .json(&recipe_body("bread"))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/recipes/{}", id);

    assert_eq!(app.get(&uri, Some(&bob)).await.status_code(), StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&mallory)).await.status_code(), StatusCode::NOT_FOUND);

    // Visible, but only the owner may change it
    let response = app.put(&uri, Some(&bob)).json(&recipe_body("stolen")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "No recipe updated");

    let comment = app
        .post("/comments", Some(&mallory))
        .json(&json!({"text": "hi", "recipeId": id}))
        .await;
    assert_eq!(comment.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let app = TestApp::new();
    let token = app.writer("alice").await;
    let recipe_id = app
        .post("/recipes", Some(&token))
        .json(&recipe_body("bread"))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();

    let created = app
        .post("/comments", Some(&token))
        .json(&json!({"text": "tasty", "recipeId": recipe_id}))
        .await;
    assert_eq!(created.status_code(), StatusCode::OK);
    let id = created.json::<Value>()["id"].as_i64().unwrap();
    let uri = format!("/comments/{}", id);

    let fetched = app.get(&uri, Some(&token)).await.json::<Value>();
    assert_eq!(fetched["comment"]["text"], "tasty");
    assert_eq!(fetched["comment"]["editedDate"], Value::Null);

    let edited = app.put(&uri, Some(&token)).json(&json!({"text": "very tasty"})).await;
    assert_eq!(edited.status_code(), StatusCode::OK);
    let fetched = app.get(&uri, Some(&token)).await.json::<Value>();
    assert_eq!(fetched["comment"]["text"], "very tasty");
    assert!(fetched["comment"]["editedDate"].is_string());

    assert_eq!(app.delete(&uri, Some(&token)).await.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&uri, Some(&token)).await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_recipe_removes_its_comments() {
    let app = TestApp::new();
    let token = app.writer("alice").await;
    let recipe_id = app
        .post("/recipes", Some(&token))
        .json(&recipe_body("bread"))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();
    app.post("/comments", Some(&token))
        .json(&json!({"text": "tasty", "recipeId": recipe_id}))
        .await;

    app.delete(&format!("/recipes/{}", recipe_id), Some(&token)).await;

    let comments = app.get("/comments", Some(&token)).await.json::<Value>();
    assert_eq!(comments["comments"], json!([]));
}

#[tokio::test]
async fn test_create_category_returns_id() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = app
        .post("/categories", Some(&token))
        .json(&json!({"name": "Baking"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.json::<Value>()["id"].is_i64());

    let categories = app.get("/categories", Some(&token)).await.json::<Value>();
    assert_eq!(categories["categories"][0]["name"], "Baking");
}

#[tokio::test]
async fn test_shared_snapshot_round_trip() {
    let app = TestApp::new();
    let token = app.writer("alice").await;
    let snapshot = json!({"title": "bread", "ingredients": "flour"});

    let created = app.post("/uniqueRecipes", Some(&token)).json(&snapshot).await;
    assert_eq!(created.status_code(), StatusCode::OK);
    let id = created.json::<Value>()["createdId"].as_str().unwrap().to_string();

    let fetched = app.get(&format!("/uniqueRecipes/{}", id), None).await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    assert_eq!(fetched.json::<Value>(), snapshot);

    let missing = app.get("/uniqueRecipes/does-not-exist", None).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shared_snapshot_requires_session() {
    let app = TestApp::new();
    let response = app.post("/uniqueRecipes", None).json(&json!({})).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
