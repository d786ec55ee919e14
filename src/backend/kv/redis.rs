/**
 * Redis Key-Value Store
 *
 * Redis implementation of the key-value traits. Commands go through a shared
 * `ConnectionManager`, which reconnects transparently. Every subscription
 * opens its own pub/sub connection so that dropping it releases exactly that
 * subscriber.
 *
 * # Key Layout
 *
 * | Key                       | Type   | Contents                              |
 * |---------------------------|--------|---------------------------------------|
 * | `shopping:{list_key}`     | hash   | item id -> item JSON                  |
 * | `shopping:{list_key}`     | topic  | change events for the list            |
 * | `lists:{user_name}`       | list   | list references, most recent first    |
 * | `push:subscriptions`      | hash   | session id -> registration JSON       |
 * | `shared-recipe:{id}`      | string | recipe snapshot, expires after TTL    |
 *
 * Pub/sub channels live in their own namespace, so a topic may share its name
 * with the hash of the same list.
 */

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use super::{
    ListStore, PushRegistrationStore, SharedRecipeStore, StoreError, TopicSubscription,
};

const REGISTRATIONS_KEY: &str = "push:subscriptions";

fn list_hash_key(list_key: &str) -> String {
    format!("shopping:{}", list_key)
}

fn directory_key(user_name: &str) -> String {
    format!("lists:{}", user_name)
}

fn shared_key(id: &str) -> String {
    format!("shared-recipe:{}", id)
}

/// Redis-backed key-value store
#[derive(Clone)]
pub struct RedisKvStore {
    client: Client,
    connection: ConnectionManager,
}

impl RedisKvStore {
    /// Connect to `redis_url`
    ///
    /// Fails if the URL is malformed or the first connection cannot be made.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        tracing::info!("[Redis] Connected");
        Ok(Self { client, connection })
    }
}

#[async_trait]
impl ListStore for RedisKvStore {
    async fn item_values(&self, list_key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection.clone();
        let values: Vec<String> = conn.hvals(list_hash_key(list_key)).await?;
        Ok(values)
    }

    async fn set_item(&self, list_key: &str, item_id: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: () = conn.hset(list_hash_key(list_key), item_id, value).await?;
        Ok(())
    }

    async fn remove_item(&self, list_key: &str, item_id: &str) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: () = conn.hdel(list_hash_key(list_key), item_id).await?;
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: String) -> Result<usize, StoreError> {
        let mut conn = self.connection.clone();
        let receivers: i64 = conn.publish(topic, payload).await?;
        Ok(usize::try_from(receivers).unwrap_or(0))
    }

    async fn subscribe(&self, topic: &str) -> Result<TopicSubscription, StoreError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(topic).await?;

        let name = topic.to_string();
        let messages = pubsub.into_on_message().filter_map(move |message| {
            let decoded = message.get_payload::<String>();
            let name = name.clone();
            async move {
                match decoded {
                    Ok(payload) => Some(payload),
                    Err(err) => {
                        tracing::warn!("[PubSub] Undecodable payload on {}: {}", name, err);
                        None
                    }
                }
            }
        });

        tracing::debug!("[PubSub] Subscribed to {}", topic);
        Ok(TopicSubscription::new(topic, Box::pin(messages)))
    }

    async fn directory(&self, user_name: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection.clone();
        let entries: Vec<String> = conn.lrange(directory_key(user_name), 0, -1).await?;
        Ok(entries)
    }

    async fn push_directory_entry(&self, user_name: &str, entry: String) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let key = directory_key(user_name);
        let _: () = conn.lrem(&key, 0, &entry).await?;
        let _: () = conn.lpush(&key, entry).await?;
        Ok(())
    }

    async fn remove_directory_entry(&self, user_name: &str, entry: &str) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: () = conn.lrem(directory_key(user_name), 0, entry).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl PushRegistrationStore for RedisKvStore {
    async fn registrations(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut conn = self.connection.clone();
        let all: HashMap<String, String> = conn.hgetall(REGISTRATIONS_KEY).await?;
        Ok(all.into_iter().collect())
    }

    async fn put_registration(&self, session_id: &str, registration: String) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: () = conn.hset(REGISTRATIONS_KEY, session_id, registration).await?;
        Ok(())
    }

    async fn remove_registration(&self, session_id: &str) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: () = conn.hdel(REGISTRATIONS_KEY, session_id).await?;
        Ok(())
    }
}

#[async_trait]
impl SharedRecipeStore for RedisKvStore {
    async fn put_shared(&self, id: &str, snapshot: String, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(shared_key(id), snapshot, ttl.as_secs()).await?;
        Ok(())
    }

    async fn get_shared(&self, id: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        let snapshot: Option<String> = conn.get(shared_key(id)).await?;
        Ok(snapshot)
    }
}
