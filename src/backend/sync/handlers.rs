/**
 * Sync Read Handlers
 *
 * `GET /recipes`, `/categories`, `/comments` and `/users`, each accepting an
 * optional integer `checksum` query parameter.
 */

use std::sync::Arc;

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::backend::error::BackendError;
use crate::backend::middleware::Requester;
use crate::backend::recipes::store::RecipeStore;
use crate::backend::sync::protocol::{sync_collection, SyncResponse};
use crate::shared::{Category, Collection, Comment, Recipe, UserSummary};

/// Query parameters of a sync read
#[derive(Debug, Default, Deserialize)]
pub struct SyncQuery {
    pub checksum: Option<i64>,
}

fn client_checksum(query: Result<Query<SyncQuery>, QueryRejection>) -> Result<Option<i64>, BackendError> {
    query
        .map(|Query(query)| query.checksum)
        .map_err(|_| BackendError::validation("checksum", "checksum must be an integer"))
}

pub async fn sync_recipes(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    query: Result<Query<SyncQuery>, QueryRejection>,
) -> Result<SyncResponse<Recipe>, BackendError> {
    let scope = requester.scope();
    let outcome = sync_collection(store.as_ref(), Collection::Recipes, client_checksum(query)?, || {
        store.recipes(&scope)
    })
    .await?;
    Ok(SyncResponse { collection: Collection::Recipes, outcome })
}

pub async fn sync_categories(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    query: Result<Query<SyncQuery>, QueryRejection>,
) -> Result<SyncResponse<Category>, BackendError> {
    let scope = requester.scope();
    let outcome = sync_collection(store.as_ref(), Collection::Categories, client_checksum(query)?, || {
        store.categories(&scope)
    })
    .await?;
    Ok(SyncResponse { collection: Collection::Categories, outcome })
}

pub async fn sync_comments(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    query: Result<Query<SyncQuery>, QueryRejection>,
) -> Result<SyncResponse<Comment>, BackendError> {
    let scope = requester.scope();
    let outcome = sync_collection(store.as_ref(), Collection::Comments, client_checksum(query)?, || {
        store.comments(&scope)
    })
    .await?;
    Ok(SyncResponse { collection: Collection::Comments, outcome })
}

pub async fn sync_users(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    query: Result<Query<SyncQuery>, QueryRejection>,
) -> Result<SyncResponse<UserSummary>, BackendError> {
    let scope = requester.scope();
    let outcome = sync_collection(store.as_ref(), Collection::Users, client_checksum(query)?, || {
        store.users(&scope)
    })
    .await?;
    Ok(SyncResponse { collection: Collection::Users, outcome })
}
