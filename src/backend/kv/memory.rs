/**
 * In-Memory Key-Value Store
 *
 * Process-local implementation of every key-value trait, used when no Redis
 * URL is configured and throughout the test suite.
 *
 * # Pub/Sub
 *
 * Each topic gets its own `tokio::sync::broadcast` channel, created lazily on
 * first subscribe. Publishing to a topic nobody has subscribed to is a no-op,
 * matching Redis `PUBLISH` semantics. Channels whose receivers have all gone
 * away are removed by [`MemoryKvStore::cleanup_inactive_topics`].
 *
 * # Expiry
 *
 * Shared snapshots carry a deadline. Reads past the deadline miss, and
 * [`MemoryKvStore::prune_expired_snapshots`] drops the ones nobody reads.
 *
 * # Ordering
 *
 * List hashes are `BTreeMap`s, so values come back ordered by item id. Callers
 * must not rely on any particular order, the Redis backend gives none.
 */

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;

use super::{
    ListStore, PushRegistrationStore, SharedRecipeStore, StoreError, TopicSubscription,
};

/// Buffered messages per topic before slow subscribers start lagging
const TOPIC_CAPACITY: usize = 1000;

#[derive(Default)]
struct MemoryData {
    hashes: HashMap<String, BTreeMap<String, String>>,
    directories: HashMap<String, Vec<String>>,
    registrations: BTreeMap<String, String>,
    shared: HashMap<String, (String, Instant)>,
}

/// In-process key-value store
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    data: Arc<RwLock<MemoryData>>,
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn topics(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<String>>> {
        // The map stays consistent even if a holder panicked mid-operation.
        self.topics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop topic channels that no longer have subscribers
    ///
    /// Returns the number of channels removed.
    pub fn cleanup_inactive_topics(&self) -> usize {
        let mut topics = self.topics();
        let before = topics.len();
        topics.retain(|_, sender| sender.receiver_count() > 0);
        before - topics.len()
    }

    /// Drop shared snapshots past their deadline
    ///
    /// Returns the number of snapshots removed.
    pub async fn prune_expired_snapshots(&self) -> usize {
        let now = Instant::now();
        let mut data = self.data.write().await;
        let before = data.shared.len();
        data.shared.retain(|_, (_, expires_at)| *expires_at > now);
        before - data.shared.len()
    }

    /// Current subscriber count for a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics()
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ListStore for MemoryKvStore {
    async fn item_values(&self, list_key: &str) -> Result<Vec<String>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .hashes
            .get(list_key)
            .map(|hash| hash.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_item(&self, list_key: &str, item_id: &str, value: String) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.hashes
            .entry(list_key.to_string())
            .or_default()
            .insert(item_id.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, list_key: &str, item_id: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if let Some(hash) = data.hashes.get_mut(list_key) {
            hash.remove(item_id);
            if hash.is_empty() {
                data.hashes.remove(list_key);
            }
        }
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: String) -> Result<usize, StoreError> {
        let topics = self.topics();
        match topics.get(topic) {
            // send only fails when every receiver is gone
            Some(sender) => Ok(sender.send(payload).unwrap_or(0)),
            None => Ok(0),
        }
    }

    async fn subscribe(&self, topic: &str) -> Result<TopicSubscription, StoreError> {
        let receiver = self
            .topics()
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe();

        let name = topic.to_string();
        let messages = stream::unfold((receiver, name), |(mut receiver, name)| async move {
            loop {
                match receiver.recv().await {
                    Ok(payload) => return Some((payload, (receiver, name))),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("[PubSub] Subscriber on {} lagged, skipped {} messages", name, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        tracing::debug!("[PubSub] Subscribed to {}", topic);
        Ok(TopicSubscription::new(topic, Box::pin(messages)))
    }

    async fn directory(&self, user_name: &str) -> Result<Vec<String>, StoreError> {
        let data = self.data.read().await;
        Ok(data.directories.get(user_name).cloned().unwrap_or_default())
    }

    async fn push_directory_entry(&self, user_name: &str, entry: String) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let entries = data.directories.entry(user_name.to_string()).or_default();
        entries.retain(|existing| existing != &entry);
        entries.insert(0, entry);
        Ok(())
    }

    async fn remove_directory_entry(&self, user_name: &str, entry: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if let Some(entries) = data.directories.get_mut(user_name) {
            entries.retain(|existing| existing != entry);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl PushRegistrationStore for MemoryKvStore {
    async fn registrations(&self) -> Result<Vec<(String, String)>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .registrations
            .iter()
            .map(|(session, registration)| (session.clone(), registration.clone()))
            .collect())
    }

    async fn put_registration(&self, session_id: &str, registration: String) -> Result<(), StoreError> {
        self.data
            .write()
            .await
            .registrations
            .insert(session_id.to_string(), registration);
        Ok(())
    }

    async fn remove_registration(&self, session_id: &str) -> Result<(), StoreError> {
        self.data.write().await.registrations.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl SharedRecipeStore for MemoryKvStore {
    async fn put_shared(&self, id: &str, snapshot: String, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = Instant::now() + ttl;
        self.data
            .write()
            .await
            .shared
            .insert(id.to_string(), (snapshot, expires_at));
        Ok(())
    }

    async fn get_shared(&self, id: &str) -> Result<Option<String>, StoreError> {
        let mut data = self.data.write().await;
        match data.shared.get(id) {
            Some((snapshot, expires_at)) if *expires_at > Instant::now() => Ok(Some(snapshot.clone())),
            Some(_) => {
                data.shared.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
