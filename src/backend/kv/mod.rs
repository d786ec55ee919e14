//! Key-Value Store Module
//!
//! The shared key/hash/pub-sub store behind shopping lists, push
//! registrations and shared recipe snapshots. Each concern gets its own trait so
//! handlers depend only on what they use; both backends implement all of them.
//!
//! # Architecture
//!
//! - **`error`** - `StoreError`, shared with the relational store
//! - **`memory`** - In-process backend (`tokio::sync::broadcast` per topic)
//! - **`redis`** - Redis backend (hashes, lists, `PUBLISH`/`SUBSCRIBE`)
//!
//! # Atomicity
//!
//! Every method is a single store command and atomic on its own. Nothing here
//! groups commands into transactions; callers that issue several commands accept
//! that a crash can leave only some of them applied.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::Stream;

/// Store error type
pub mod error;

/// In-memory backend
pub mod memory;

/// Redis backend
pub mod redis;

pub use error::StoreError;
pub use memory::MemoryKvStore;
pub use self::redis::RedisKvStore;

/// Boxed stream of raw topic payloads
pub type TopicStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// A live subscription to one pub/sub topic
///
/// Yields every payload published on the topic after the subscription was
/// established. Dropping the handle (or calling [`TopicSubscription::unsubscribe`])
/// releases the underlying receiver or connection.
pub struct TopicSubscription {
    topic: String,
    messages: TopicStream,
}

impl TopicSubscription {
    pub fn new(topic: impl Into<String>, messages: TopicStream) -> Self {
        Self {
            topic: topic.into(),
            messages,
        }
    }

    /// Stop listening and release the subscription
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Stream for TopicSubscription {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.messages.as_mut().poll_next(cx)
    }
}

impl Drop for TopicSubscription {
    fn drop(&mut self) {
        tracing::debug!("[PubSub] Unsubscribed from {}", self.topic);
    }
}

/// Hash and pub/sub operations backing shopping lists
#[async_trait]
pub trait ListStore: Send + Sync {
    /// All values stored in the list hash, in store order
    async fn item_values(&self, list_key: &str) -> Result<Vec<String>, StoreError>;

    /// Set one hash field
    async fn set_item(&self, list_key: &str, item_id: &str, value: String) -> Result<(), StoreError>;

    /// Remove one hash field; absent fields are not an error
    async fn remove_item(&self, list_key: &str, item_id: &str) -> Result<(), StoreError>;

    /// Publish a payload, returning how many subscribers it reached
    async fn publish(&self, topic: &str, payload: String) -> Result<usize, StoreError>;

    /// Subscribe to a topic
    async fn subscribe(&self, topic: &str) -> Result<TopicSubscription, StoreError>;

    /// Entries of a user's list directory, most recent first
    async fn directory(&self, user_name: &str) -> Result<Vec<String>, StoreError>;

    /// Move `entry` to the front of the directory, adding it if absent
    async fn push_directory_entry(&self, user_name: &str, entry: String) -> Result<(), StoreError>;

    /// Remove every copy of `entry` from the directory
    async fn remove_directory_entry(&self, user_name: &str, entry: &str) -> Result<(), StoreError>;

    /// Cheap liveness check
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Registry of push subscriptions keyed by session id
#[async_trait]
pub trait PushRegistrationStore: Send + Sync {
    /// Every `(session_id, registration)` pair
    async fn registrations(&self) -> Result<Vec<(String, String)>, StoreError>;

    /// Store or replace the registration of a session
    async fn put_registration(&self, session_id: &str, registration: String) -> Result<(), StoreError>;

    /// Drop the registration of a session
    async fn remove_registration(&self, session_id: &str) -> Result<(), StoreError>;
}

/// Expiring storage for shared recipe snapshots
#[async_trait]
pub trait SharedRecipeStore: Send + Sync {
    async fn put_shared(&self, id: &str, snapshot: String, ttl: Duration) -> Result<(), StoreError>;

    /// The snapshot, or `None` when unknown or expired
    async fn get_shared(&self, id: &str) -> Result<Option<String>, StoreError>;
}
