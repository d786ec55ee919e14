/**
 * Push Subscription Handlers
 *
 * `POST /subscriptions/` registers the browser's push subscription for the
 * calling session. `GET /webpush_public_key` hands out the VAPID public key
 * the browser needs to subscribe.
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::backend::error::BackendError;
use crate::backend::middleware::{JsonBody, SessionContext};
use crate::backend::notifications::fanout::NotificationFanout;
use crate::backend::notifications::push::PushSubscription;
use crate::backend::server::config::ServerConfig;

pub async fn subscribe(
    session: SessionContext,
    State(fanout): State<NotificationFanout>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    let subscription = PushSubscription::from_body(&body)?;
    fanout
        .register(&session.session_id, &session.user_name, subscription)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn public_key(State(config): State<Arc<ServerConfig>>) -> Result<Json<Value>, BackendError> {
    let key = config
        .push
        .public_key
        .as_deref()
        .ok_or_else(|| BackendError::not_found("Push notifications are not configured"))?;
    Ok(Json(json!({ "public_key": key })))
}
