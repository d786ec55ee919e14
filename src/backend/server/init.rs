/**
 * Server Initialization
 *
 * Builds the application from a [`ServerConfig`]:
 * 1. Connect the recipe store (PostgreSQL, or in-memory without `DATABASE_URL`)
 * 2. Connect the key/pub-sub store (Redis, or in-memory without `REDIS_URL`)
 * 3. Set up push delivery when a VAPID key is configured
 * 4. Create the router
 *
 * A configured service that fails to connect is logged and replaced by its
 * in-memory counterpart, so the server always starts.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::backend::kv::{MemoryKvStore, RedisKvStore};
use crate::backend::notifications::{PushDelivery, VapidPushDelivery};
use crate::backend::recipes::{MemoryRecipeStore, PgRecipeStore, RecipeStore};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{PushConfig, ServerConfig};
use crate::backend::server::state::{AppState, KvBackends};

/// How often idle in-memory topics and expired snapshots are pruned
const TOPIC_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing recipebook backend server");

    let recipes = load_recipe_store(&config).await;
    let kv = load_kv_store(&config).await;
    let delivery = load_push_delivery(&config.push);

    let state = AppState::new(config, recipes, kv, delivery);
    let app = create_router(state);

    tracing::info!("Router configured");
    app
}

async fn load_recipe_store(config: &ServerConfig) -> Arc<dyn RecipeStore> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set. Recipes are kept in memory and lost on restart.");
        return Arc::new(MemoryRecipeStore::new());
    };

    match PgRecipeStore::connect(database_url).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to connect to the database: {}", e);
            tracing::warn!("Recipes are kept in memory and lost on restart.");
            Arc::new(MemoryRecipeStore::new())
        }
    }
}

async fn load_kv_store(config: &ServerConfig) -> KvBackends {
    if let Some(redis_url) = &config.redis_url {
        match RedisKvStore::connect(redis_url).await {
            Ok(store) => return KvBackends::single(store),
            Err(e) => tracing::error!("Failed to connect to Redis: {}", e),
        }
    } else {
        tracing::warn!("REDIS_URL not set.");
    }

    tracing::warn!("Shopping lists and push subscriptions are kept in memory.");
    let store = MemoryKvStore::new();
    spawn_topic_cleanup(store.clone());
    KvBackends::single(store)
}

fn load_push_delivery(push: &PushConfig) -> Option<Arc<dyn PushDelivery>> {
    let (Some(pem), Some(public_key)) = (&push.private_key_pem, &push.public_key) else {
        tracing::warn!("PUSH_PRIVATE_KEY_PEM or PUSH_PUBLIC_KEY not set. Push delivery disabled.");
        return None;
    };

    match VapidPushDelivery::from_pem(pem.as_bytes(), public_key, &push.contact) {
        Ok(delivery) => {
            tracing::info!("Push delivery enabled");
            Some(Arc::new(delivery))
        }
        Err(e) => {
            tracing::error!("Invalid push key: {}", e);
            tracing::warn!("Push delivery disabled.");
            None
        }
    }
}

/// Periodically drop in-memory topics that no stream listens to, along with
/// shared snapshots past their expiry
fn spawn_topic_cleanup(store: MemoryKvStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOPIC_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = store.cleanup_inactive_topics();
            let expired = store.prune_expired_snapshots().await;
            tracing::debug!(
                "Cleaned up {} inactive list topics and {} expired snapshots",
                removed,
                expired
            );
        }
    });
}
