/**
 * Application State
 *
 * `AppState` holds every service the handlers use. Handlers never take the
 * whole state; each extracts the one service it needs through the `FromRef`
 * implementations below.
 *
 * Stores sit behind trait objects, so the same router runs against Redis and
 * PostgreSQL in production and against the in-memory stores in tests.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::SessionKeys;
use crate::backend::images::{FsImageStore, ImageStore};
use crate::backend::kv::{ListStore, PushRegistrationStore, SharedRecipeStore};
use crate::backend::notifications::{NotificationFanout, PushDelivery};
use crate::backend::recipes::RecipeStore;
use crate::backend::server::config::ServerConfig;
use crate::backend::shopping::{ChangeFeedBroker, ListDirectory};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: SessionKeys,
    pub recipes: Arc<dyn RecipeStore>,
    pub lists: Arc<dyn ListStore>,
    pub shared_recipes: Arc<dyn SharedRecipeStore>,
    pub broker: ChangeFeedBroker,
    pub directory: ListDirectory,
    pub fanout: NotificationFanout,
    pub images: Arc<dyn ImageStore>,
}

/// Key/pub-sub backend shared by lists, push registrations and snapshots
pub struct KvBackends {
    pub lists: Arc<dyn ListStore>,
    pub registrations: Arc<dyn PushRegistrationStore>,
    pub shared_recipes: Arc<dyn SharedRecipeStore>,
}

impl KvBackends {
    /// Use one store for all three roles
    pub fn single<S>(store: S) -> Self
    where
        S: ListStore + PushRegistrationStore + SharedRecipeStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            lists: store.clone(),
            registrations: store.clone(),
            shared_recipes: store,
        }
    }
}

impl AppState {
    /// Wire the services around the given stores
    pub fn new(
        config: ServerConfig,
        recipes: Arc<dyn RecipeStore>,
        kv: KvBackends,
        delivery: Option<Arc<dyn PushDelivery>>,
    ) -> Self {
        let sessions = SessionKeys::new(config.jwt_secret.as_bytes(), config.session_days);
        let images: Arc<dyn ImageStore> = Arc::new(FsImageStore::new(config.image_folder.clone()));

        Self {
            sessions,
            broker: ChangeFeedBroker::new(kv.lists.clone()),
            directory: ListDirectory::new(kv.lists.clone()),
            fanout: NotificationFanout::new(kv.registrations, delivery),
            config: Arc::new(config),
            recipes,
            lists: kv.lists,
            shared_recipes: kv.shared_recipes,
            images,
        }
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<dyn RecipeStore> {
    fn from_ref(state: &AppState) -> Self {
        state.recipes.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ListStore> {
    fn from_ref(state: &AppState) -> Self {
        state.lists.clone()
    }
}

impl FromRef<AppState> for Arc<dyn SharedRecipeStore> {
    fn from_ref(state: &AppState) -> Self {
        state.shared_recipes.clone()
    }
}

impl FromRef<AppState> for ChangeFeedBroker {
    fn from_ref(state: &AppState) -> Self {
        state.broker.clone()
    }
}

impl FromRef<AppState> for ListDirectory {
    fn from_ref(state: &AppState) -> Self {
        state.directory.clone()
    }
}

impl FromRef<AppState> for NotificationFanout {
    fn from_ref(state: &AppState) -> Self {
        state.fanout.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ImageStore> {
    fn from_ref(state: &AppState) -> Self {
        state.images.clone()
    }
}
