/**
 * Authentication Extractors
 *
 * Session identity is resolved per request from a signed token and handed to
 * handlers as an explicit value; nothing reads ambient session state.
 *
 * # Extractors
 *
 * - [`SessionContext`] - verified `{user_name, session_id}` from the token alone
 * - `Option<SessionContext>` - same, but absent or invalid tokens yield `None`
 * - [`Requester`] - the session plus the user's current row from the recipe store
 *
 * # Token Sources
 *
 * The `Authorization: Bearer <token>` header wins over the `session` cookie.
 * Browsers opening an `EventSource` cannot set headers, so the cookie path is
 * needed for shopping-list streams.
 */

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};

use crate::backend::auth::sessions::{SessionKeys, SESSION_COOKIE};
use crate::backend::error::BackendError;
use crate::backend::recipes::store::{RecipeStore, Scope, UserRecord};

const UNAUTHORIZED: &str = "Unauthorized access";

/// Verified identity of the calling session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_name: String,
    pub session_id: String,
}

/// Pull the raw session token from the request headers
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn resolve_session(parts: &Parts, keys: &SessionKeys) -> Result<SessionContext, BackendError> {
    let token = session_token(&parts.headers).ok_or_else(|| {
        tracing::debug!("[Auth] No session token");
        BackendError::auth(UNAUTHORIZED)
    })?;

    let claims = keys.verify(&token).map_err(|err| {
        tracing::warn!("[Auth] Invalid session token: {}", err);
        BackendError::auth(UNAUTHORIZED)
    })?;

    Ok(SessionContext {
        user_name: claims.sub,
        session_id: claims.sid,
    })
}

impl<S> FromRequestParts<S> for SessionContext
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        resolve_session(parts, &keys)
    }
}

impl<S> OptionalFromRequestParts<S> for SessionContext
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        Ok(resolve_session(parts, &keys).ok())
    }
}

/// An authenticated session together with its user row
#[derive(Debug, Clone)]
pub struct Requester {
    pub session: SessionContext,
    pub user: UserRecord,
}

impl Requester {
    pub fn scope(&self) -> Scope {
        self.user.scope()
    }

    pub fn can_write(&self) -> bool {
        !self.user.read_only
    }

    /// Reject read-only accounts
    pub fn ensure_write_access(&self) -> Result<(), BackendError> {
        if self.can_write() {
            Ok(())
        } else {
            tracing::info!("[Auth] {} has no write access", self.user.user_name);
            Err(BackendError::WriteAccess)
        }
    }
}

impl<S> FromRequestParts<S> for Requester
where
    SessionKeys: FromRef<S>,
    Arc<dyn RecipeStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let session = resolve_session(parts, &keys)?;

        let store = <Arc<dyn RecipeStore> as FromRef<S>>::from_ref(state);
        let user = store.find_user(&session.user_name).await?.ok_or_else(|| {
            tracing::warn!("[Auth] Session for unknown user {}", session.user_name);
            BackendError::auth(UNAUTHORIZED)
        })?;

        Ok(Requester { session, user })
    }
}
