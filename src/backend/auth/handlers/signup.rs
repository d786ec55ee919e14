/**
 * Signup Handler
 *
 * `POST /users` registers a writable account without a group. Signing up
 * does not log the user in.
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::backend::auth::handlers::types::Credentials;
use crate::backend::auth::users::register;
use crate::backend::error::BackendError;
use crate::backend::middleware::JsonBody;
use crate::backend::recipes::store::RecipeStore;
use crate::backend::server::config::ServerConfig;

/// Signup handler
///
/// # Errors
///
/// * `400 Bad Request` - Missing fields, username under 3 or password under 8 characters
/// * `409 Conflict` - If the username is taken
pub async fn signup(
    State(store): State<Arc<dyn RecipeStore>>,
    State(config): State<Arc<ServerConfig>>,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, BackendError> {
    let credentials = Credentials::from_body(&body)?;
    register(
        store.as_ref(),
        &credentials.username,
        &credentials.password,
        config.bcrypt_cost,
    )
    .await?;
    Ok(Json(json!({})))
}
