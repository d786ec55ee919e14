//! Shopping-list realtime integration tests
//!
//! Streams, write batches and the list directory, driven through the router.

use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{ids, item, TestApp};

#[tokio::test]
async fn test_stream_starts_with_current_list() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = app
        .post("/shoppingList", Some(&token))
        .json(&json!([item("b", "bread", 1.0)]))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let (status, headers, mut events) = app.stream("/shoppingList", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "text/event-stream");
    assert_eq!(headers["x-accel-buffering"], "no");
    assert!(headers["cache-control"].to_str().unwrap().contains("no-transform"));

    assert_eq!(ids(&events.next_json().await), vec!["b"]);
}

#[tokio::test]
async fn test_writer_receives_its_own_change() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let (_, _, mut events) = app.stream("/shoppingList", Some(&token)).await;
    assert_eq!(events.next_json().await, json!([]));

    app.put("/shoppingList", Some(&token))
        .json(&json!([item("m", "milk", 1.0)]))
        .await;

    let snapshot = events.next_json().await;
    assert_eq!(ids(&snapshot), vec!["m"]);
    assert_eq!(snapshot[0]["text"], "milk");
}

#[tokio::test]
async fn test_all_subscribers_see_the_same_snapshots() {
    let app = TestApp::new();

    let (_, _, mut first) = app.stream("/shoppingLists/party", None).await;
    let (_, _, mut second) = app.stream("/shoppingLists/party", None).await;
    first.next_json().await;
    second.next_json().await;

    app.post("/shoppingLists/party", None)
        .json(&json!([item("a", "apples", 1.0)]))
        .await;
    app.post("/shoppingLists/party", None)
        .json(&json!([item("c", "cake", 2.0)]))
        .await;

    for events in [&mut first, &mut second] {
        assert_eq!(ids(&events.next_json().await), vec!["a"]);
        assert_eq!(ids(&events.next_json().await), vec!["a", "c"]);
    }
}

#[tokio::test]
async fn test_closing_a_stream_unsubscribes_it() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let (_, _, mut events) = app.stream("/shoppingList", Some(&token)).await;
    let (_, _, other) = app.stream("/shoppingLists/alice", None).await;
    events.next_json().await;
    assert_eq!(app.kv.subscriber_count("shopping:alice"), 2);

    drop(events);
    assert_eq!(app.kv.subscriber_count("shopping:alice"), 1);

    drop(other);
    assert_eq!(app.kv.subscriber_count("shopping:alice"), 0);

    // Writes to a list nobody watches still succeed
    let response = app
        .post("/shoppingList", Some(&token))
        .json(&json!([item("a", "apples", 1.0)]))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_later_write_to_same_item_wins() {
    let app = TestApp::new();

    app.post("/shoppingLists/l1", None)
        .json(&json!([item("x", "first", 1.0)]))
        .await;
    app.post("/shoppingLists/l1", None)
        .json(&json!([item("x", "second", 1.0)]))
        .await;

    let (_, _, mut events) = app.stream("/shoppingLists/l1", None).await;
    let snapshot = events.next_json().await;
    assert_eq!(snapshot.as_array().unwrap().len(), 1);
    assert_eq!(snapshot[0]["text"], "second");
}

#[tokio::test]
async fn test_delete_removes_items_and_is_idempotent() {
    let app = TestApp::new();
    app.post("/shoppingLists/l2", None)
        .json(&json!([item("a", "apples", 1.0), item("b", "bread", 2.0)]))
        .await;

    for _ in 0..2 {
        let response = app
            .delete("/shoppingLists/l2", None)
            .json(&json!([item("a", "apples", 1.0)]))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let (_, _, mut events) = app.stream("/shoppingLists/l2", None).await;
    assert_eq!(ids(&events.next_json().await), vec!["b"]);
}

#[tokio::test]
async fn test_invalid_batch_changes_nothing() {
    let app = TestApp::new();
    let (_, _, mut events) = app.stream("/shoppingLists/l3", None).await;
    events.next_json().await;

    let response = app
        .post("/shoppingLists/l3", None)
        .json(&json!([
            item("ok", "fine", 1.0),
            {"id": "bad", "text": "no position", "checked": false, "addedTime": "2024-01-01T00:00:00Z"}
        ]))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Each element requires position");
    assert!(!events.has_event_within(Duration::from_millis(100)).await);
}

#[tokio::test]
async fn test_lists_do_not_leak_into_each_other() {
    let app = TestApp::new();
    let (_, _, mut other) = app.stream("/shoppingLists/other", None).await;
    other.next_json().await;

    app.post("/shoppingLists/mine", None)
        .json(&json!([item("a", "apples", 1.0)]))
        .await;

    assert!(!other.has_event_within(Duration::from_millis(100)).await);
}

#[tokio::test]
async fn test_private_list_requires_session() {
    let app = TestApp::new();

    let (status, _, _) = app.stream("/shoppingList", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .post("/shoppingList", None)
        .json(&json!([item("a", "apples", 1.0)]))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_private_lists_are_per_user() {
    let app = TestApp::new();
    let alice = app.writer("alice").await;
    let bob = app.writer("bob").await;

    app.post("/shoppingList", Some(&alice))
        .json(&json!([item("a", "apples", 1.0)]))
        .await;

    let (_, _, mut events) = app.stream("/shoppingList", Some(&bob)).await;
    assert_eq!(events.next_json().await, json!([]));

    // The private list of a user is the public list keyed by their name
    let (_, _, mut events) = app.stream("/shoppingLists/alice", None).await;
    assert_eq!(ids(&events.next_json().await), vec!["a"]);
}

#[tokio::test]
async fn test_directory_is_seeded_with_private_list() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = app.get("/shoppingLists", Some(&token)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!([{"id": "alice", "name": "Private"}]));
}

#[tokio::test]
async fn test_directory_add_moves_entry_to_front() {
    let app = TestApp::new();
    let token = app.writer("alice").await;
    app.get("/shoppingLists", Some(&token)).await;

    let party = json!({"id": "party", "name": "Party"});
    let added = app.post("/shoppingLists", Some(&token)).json(&party).await;
    assert_eq!(added.status_code(), StatusCode::OK);
    app.post("/shoppingLists", Some(&token))
        .json(&json!({"id": "bbq", "name": "BBQ"}))
        .await;
    app.post("/shoppingLists", Some(&token)).json(&party).await;

    let entries = app.get("/shoppingLists", Some(&token)).await.json::<Value>();
    assert_eq!(
        entries,
        json!([
            {"id": "party", "name": "Party"},
            {"id": "bbq", "name": "BBQ"},
            {"id": "alice", "name": "Private"},
        ])
    );

    app.delete("/shoppingLists", Some(&token)).json(&party).await;
    let entries = app.get("/shoppingLists", Some(&token)).await.json::<Value>();
    assert_eq!(entries.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_directory_entry_needs_name() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = app
        .post("/shoppingLists", Some(&token))
        .json(&json!({"id": "party"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
