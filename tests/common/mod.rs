//! Common test utilities and helpers
//!
//! - `TestApp`: the full router over in-memory stores, served by `axum-test`
//! - `SseReader`: pulls `data:` events off a long-lived streaming response

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, BodyDataStream};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::Router;
use axum_test::{TestRequest, TestServer};
use futures_util::StreamExt;
use recipebook::backend::kv::MemoryKvStore;
use recipebook::backend::notifications::PushDelivery;
use recipebook::backend::recipes::{MemoryRecipeStore, UserRecord};
use recipebook::backend::routes::create_router;
use recipebook::backend::server::{AppState, KvBackends, ServerConfig};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Test server plus handles on the stores behind it
pub struct TestApp {
    pub server: TestServer,
    router: Router,
    pub state: AppState,
    pub recipes: Arc<MemoryRecipeStore>,
    pub kv: MemoryKvStore,
    _images: TempDir,
}

/// Configuration with no external services and a cheap bcrypt cost
pub fn test_config(images: &TempDir) -> ServerConfig {
    let mut config = ServerConfig::from_lookup(|_| None).unwrap();
    config.jwt_secret = "test-secret".to_string();
    config.session_days = 1;
    config.bcrypt_cost = 4;
    config.image_folder = images.path().to_path_buf();
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_delivery(None)
    }

    pub fn with_delivery(delivery: Option<Arc<dyn PushDelivery>>) -> Self {
        let images = tempfile::tempdir().unwrap();
        let config = test_config(&images);

        let recipes = Arc::new(MemoryRecipeStore::new());
        let kv = MemoryKvStore::new();
        let state = AppState::new(config, recipes.clone(), KvBackends::single(kv.clone()), delivery);
        let router = create_router(state.clone());

        Self {
            server: TestServer::new(router.clone()).unwrap(),
            router,
            state,
            recipes,
            kv,
            _images: images,
        }
    }

    /// Create a user and start a session for it, returning the bearer token
    pub async fn session_for(&self, user_name: &str, read_only: bool, group_id: Option<i64>) -> (UserRecord, String) {
        let user = self.recipes.add_user(user_name, "unused", read_only, group_id).await;
        let (token, _) = self.state.sessions.issue(user_name).unwrap();
        (user, token)
    }

    pub async fn writer(&self, user_name: &str) -> String {
        self.session_for(user_name, false, None).await.1
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> TestRequest {
        authorized(self.server.get(path), token)
    }

    pub fn post(&self, path: &str, token: Option<&str>) -> TestRequest {
        authorized(self.server.post(path), token)
    }

    pub fn put(&self, path: &str, token: Option<&str>) -> TestRequest {
        authorized(self.server.put(path), token)
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> TestRequest {
        authorized(self.server.delete(path), token)
    }

    /// Open an SSE stream
    ///
    /// Streams never finish, so they are driven through the router directly
    /// rather than the test server.
    pub async fn stream(&self, uri: &str, token: Option<&str>) -> (StatusCode, HeaderMap, SseReader) {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, bearer(token));
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        (status, headers, SseReader::new(response.into_body()))
    }
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn authorized(request: TestRequest, token: Option<&str>) -> TestRequest {
    match token {
        Some(token) => request.add_header(header::AUTHORIZATION, bearer(token)),
        None => request,
    }
}

/// Reads `data:` payloads from an event stream body
pub struct SseReader {
    stream: BodyDataStream,
    buffer: String,
}

impl SseReader {
    pub fn new(body: Body) -> Self {
        Self {
            stream: body.into_data_stream(),
            buffer: String::new(),
        }
    }

    /// Next event's data decoded as JSON, failing after one second
    pub async fn next_json(&mut self) -> Value {
        tokio::time::timeout(Duration::from_secs(1), self.next_data())
            .await
            .expect("no event within one second")
    }

    /// Whether another event arrives within `wait`
    pub async fn has_event_within(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.next_data()).await.is_ok()
    }

    async fn next_data(&mut self) -> Value {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let data: Vec<&str> = frame
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(str::trim_start)
                    .collect();
                // Keep-alive frames carry only a comment
                if data.is_empty() {
                    continue;
                }
                return serde_json::from_str(&data.join("\n")).unwrap();
            }

            let chunk = self.stream.next().await.expect("stream ended").unwrap();
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }
}

/// A complete item as clients send it
pub fn item(id: &str, text: &str, position: f64) -> Value {
    serde_json::json!({
        "id": id,
        "text": text,
        "checked": false,
        "position": position,
        "addedTime": "2024-01-01T00:00:00Z",
    })
}

/// Item ids of a snapshot, in order
pub fn ids(snapshot: &Value) -> Vec<String> {
    snapshot
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

/// A recipe body with every required field
pub fn recipe_body(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "categoryId": 1,
        "ingredients": "flour, water",
        "description": "mix and bake",
    })
}
