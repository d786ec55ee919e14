//! Push API integration tests
//!
//! Subscription registration and the new-recipe fan-out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use recipebook::backend::notifications::{PushDelivery, PushError, PushSubscription};
use serde_json::{json, Value};

use crate::common::{recipe_body, TestApp};

/// Records every delivery and fails for the endpoints listed
#[derive(Default)]
struct RecordingDelivery {
    failing: Vec<String>,
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl PushDelivery for RecordingDelivery {
    async fn deliver(&self, subscription: &PushSubscription, payload: &str) -> Result<(), PushError> {
        self.sent
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.to_string()));
        if self.failing.contains(&subscription.endpoint) {
            Err(PushError::Rejected(404))
        } else {
            Ok(())
        }
    }
}

fn subscription_body(endpoint: &str) -> Value {
    json!({"endpoint": endpoint, "keys": {"p256dh": "key", "auth": "secret"}})
}

async fn wait_for_sent(delivery: &RecordingDelivery, count: usize) {
    for _ in 0..100 {
        if delivery.sent.lock().unwrap().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} deliveries", count);
}

#[tokio::test]
async fn test_new_recipe_is_pushed_to_other_sessions_only() {
    let delivery = Arc::new(RecordingDelivery::default());
    let app = TestApp::with_delivery(Some(delivery.clone() as Arc<dyn PushDelivery>));

    let phone = app.writer("alice").await;
    let (laptop, _) = app.state.sessions.issue("alice").unwrap();

    for (token, endpoint) in [(&phone, "https://push/phone"), (&laptop, "https://push/laptop")] {
        let response = app
            .post("/subscriptions/", Some(token))
            .json(&subscription_body(endpoint))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let created = app.post("/recipes", Some(&phone)).json(&recipe_body("bread")).await;
    assert_eq!(created.status_code(), StatusCode::OK);

    wait_for_sent(&delivery, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let sent = delivery.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "https://push/laptop");
    let payload: Value = serde_json::from_str(&sent[0].1).unwrap();
    assert_eq!(payload["title"], "bread");
}

#[tokio::test]
async fn test_failed_push_unregisters_subscription() {
    let delivery = Arc::new(RecordingDelivery {
        failing: vec!["https://push/gone".to_string()],
        ..Default::default()
    });
    let app = TestApp::with_delivery(Some(delivery.clone() as Arc<dyn PushDelivery>));

    let author = app.writer("alice").await;
    let gone = app.writer("bob").await;
    app.post("/subscriptions/", Some(&gone))
        .json(&subscription_body("https://push/gone"))
        .await;

    app.post("/recipes", Some(&author)).json(&recipe_body("bread")).await;
    wait_for_sent(&delivery, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    app.post("/recipes", Some(&author)).json(&recipe_body("cake")).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(delivery.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_subscription_needs_endpoint_and_keys() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = app
        .post("/subscriptions/", Some(&token))
        .json(&json!({"endpoint": "https://push/x"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_key_is_not_found_without_push_config() {
    let app = TestApp::new();
    let response = app.get("/webpush_public_key", None).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
