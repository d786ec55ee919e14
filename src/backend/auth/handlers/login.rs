/**
 * Login and Logout Handlers
 *
 * `POST /login` verifies credentials and starts a new session. The token is
 * returned in the body for API clients and set as an `HttpOnly` cookie for
 * browsers. `GET /logout` drops the cookie; tokens already handed out stay
 * valid until they expire.
 */

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Json, Response},
};

use crate::backend::auth::handlers::types::{Credentials, LoginResponse};
use crate::backend::auth::sessions::{expired_session_cookie, session_cookie, SessionKeys};
use crate::backend::auth::users::authenticate;
use crate::backend::error::BackendError;
use crate::backend::middleware::JsonBody;
use crate::backend::recipes::store::RecipeStore;

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - If username or password is missing
/// * `401 Unauthorized` - If the user is unknown or the password is wrong
/// * `502 Bad Gateway` - If the user table cannot be reached
///
/// # Example Request
///
/// ```http
/// POST /login HTTP/1.1
/// Content-Type: application/json
///
/// {"username": "alice", "password": "correct horse"}
/// ```
pub async fn login(
    State(store): State<Arc<dyn RecipeStore>>,
    State(keys): State<SessionKeys>,
    JsonBody(body): JsonBody,
) -> Result<Response, BackendError> {
    let credentials = Credentials::from_body(&body)?;
    let user = authenticate(store.as_ref(), &credentials.username, &credentials.password).await?;

    let (token, claims) = keys
        .issue(&user.user_name)
        .map_err(|err| BackendError::internal(format!("failed to sign session: {}", err)))?;

    tracing::info!("[Auth] {} logged in, session {}", user.user_name, claims.sid);

    let cookie = session_cookie(&token, keys.lifetime_secs());
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Logged in".to_string(),
            token,
        }),
    )
        .into_response())
}

/// Logout handler
///
/// Always succeeds, with or without a session.
pub async fn logout() -> Response {
    (
        [(SET_COOKIE, expired_session_cookie())],
        Json(serde_json::json!({})),
    )
        .into_response()
}
