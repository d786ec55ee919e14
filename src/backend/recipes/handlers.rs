/**
 * Recipe, Category and Comment Handlers
 *
 * Collection reads live in the sync module; this file covers creation and
 * single-entity access. Every route needs a session, and writes additionally
 * need a user without the read-only flag.
 *
 * Single-entity reads go through the requester's group scope, so a row owned
 * outside the caller's group answers 404 exactly like a missing row.
 *
 * Shared recipe snapshots (`/uniqueRecipes`) are opaque JSON documents kept in
 * the key/pub-sub store for thirty days.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::backend::error::BackendError;
use crate::backend::images::ImageStore;
use crate::backend::kv::SharedRecipeStore;
use crate::backend::middleware::{JsonBody, Requester, SessionContext};
use crate::backend::notifications::NotificationFanout;
use crate::backend::recipes::store::RecipeStore;
use crate::shared::recipes::{CategoryDraft, CommentDraft, CommentEdit, RecipeDraft};
use crate::shared::{Comment, Recipe};

/// Lifetime of a shared recipe snapshot
pub const SHARED_RECIPE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);

// Recipes

pub async fn create_recipe(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    State(fanout): State<NotificationFanout>,
    JsonBody(body): JsonBody,
) -> Result<Json<Recipe>, BackendError> {
    requester.ensure_write_access()?;
    let draft = RecipeDraft::from_body(&body)?;

    let recipe = store.insert_recipe(&requester.scope(), &draft).await?;
    tracing::info!("[Recipes] {} created recipe {}", requester.user.user_name, recipe.id);

    fanout.spawn_new_recipe(recipe.clone(), Some(requester.session.session_id));
    Ok(Json(recipe))
}

pub async fn get_recipe(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    Path(id): Path<i64>,
) -> Result<Json<Recipe>, BackendError> {
    store
        .recipe(&requester.scope(), id)
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Not found"))
}

pub async fn update_recipe(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    requester.ensure_write_access()?;
    let draft = RecipeDraft::from_body(&body)?;

    if store.update_recipe(&requester.scope(), id, &draft).await? {
        tracing::info!("[Recipes] {} updated recipe {}", requester.user.user_name, id);
        Ok(StatusCode::OK)
    } else {
        Err(BackendError::not_found("No recipe updated"))
    }
}

pub async fn delete_recipe(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    State(images): State<Arc<dyn ImageStore>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, BackendError> {
    requester.ensure_write_access()?;

    let Some(recipe) = store.delete_recipe(&requester.scope(), id).await? else {
        return Err(BackendError::not_found("Not found"));
    };
    tracing::info!("[Recipes] {} deleted recipe {}", requester.user.user_name, id);

    if !recipe.image.is_empty() {
        // The row is gone either way; a leftover file is only logged
        if let Err(err) = images.remove(&recipe.image).await {
            tracing::warn!("[Recipes] Could not remove image {}: {}", recipe.image, err);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

// Categories

pub async fn create_category(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, BackendError> {
    requester.ensure_write_access()?;
    let draft = CategoryDraft::from_body(&body)?;

    let id = store.insert_category(&requester.scope(), &draft).await?;
    tracing::info!("[Recipes] {} created category {}", requester.user.user_name, id);
    Ok(Json(json!({ "id": id })))
}

// Comments

pub async fn create_comment(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    JsonBody(body): JsonBody,
) -> Result<Json<Comment>, BackendError> {
    requester.ensure_write_access()?;
    let draft = CommentDraft::from_body(&body)?;
    let scope = requester.scope();

    if store.recipe(&scope, draft.recipe_id).await?.is_none() {
        return Err(BackendError::not_found("Recipe not found"));
    }

    Ok(Json(store.insert_comment(&scope, &draft).await?))
}

pub async fn get_comment(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, BackendError> {
    let comment = store
        .comment(&requester.scope(), id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found"))?;
    Ok(Json(json!({ "comment": comment })))
}

pub async fn update_comment(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    requester.ensure_write_access()?;
    let edit = CommentEdit::from_body(&body)?;

    if store.update_comment(&requester.scope(), id, &edit).await? {
        Ok(StatusCode::OK)
    } else {
        Err(BackendError::not_found("No comment updated"))
    }
}

pub async fn delete_comment(
    requester: Requester,
    State(store): State<Arc<dyn RecipeStore>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, BackendError> {
    requester.ensure_write_access()?;

    if store.delete_comment(&requester.scope(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(BackendError::not_found("Not found"))
    }
}

// Shared snapshots

pub async fn share_recipe(
    session: SessionContext,
    State(shared): State<Arc<dyn SharedRecipeStore>>,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, BackendError> {
    let id = uuid::Uuid::new_v4().to_string();
    shared
        .put_shared(&id, serde_json::to_string(&body)?, SHARED_RECIPE_TTL)
        .await?;

    tracing::info!("[Recipes] {} shared snapshot {}", session.user_name, id);
    Ok(Json(json!({ "createdId": id })))
}

pub async fn get_shared_recipe(
    State(shared): State<Arc<dyn SharedRecipeStore>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, BackendError> {
    let raw = shared
        .get_shared(&id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found"))?;
    Ok(Json(serde_json::from_str(&raw)?))
}
