/**
 * Shopping-List Handlers
 *
 * Two families of routes share the same broker:
 *
 * - `/shoppingList` - the caller's private list, keyed by user name
 * - `/shoppingLists/{list_id}` - a public list, reachable by key without a session
 *
 * `GET` opens a Server-Sent Events stream whose first event is the current
 * list and whose later events are full snapshots after every write. `POST`
 * and `PUT` upsert a batch of items, `DELETE` removes one.
 *
 * `/shoppingLists` without a key is the caller's list directory.
 */

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures_util::StreamExt;

use crate::backend::error::BackendError;
use crate::backend::middleware::{JsonBody, SessionContext};
use crate::backend::shopping::{ChangeFeedBroker, ListDirectory};
use crate::shared::{ListOperation, ListReference};

/// Reverse proxies must not buffer the stream
const ACCEL_BUFFERING: &str = "x-accel-buffering";

/// Build the SSE response for one list
async fn stream_list(broker: &ChangeFeedBroker, list_key: &str) -> Result<Response, BackendError> {
    let changes = broker.open_stream(list_key).await?;
    tracing::info!("[ShoppingList] Stream opened on {}", list_key);

    let events = changes.map(|change| Ok::<_, Infallible>(Event::default().data(change.data)));
    let sse = Sse::new(events).keep_alive(KeepAlive::default());

    Ok((
        [
            (
                HeaderName::from_static(ACCEL_BUFFERING),
                HeaderValue::from_static("no"),
            ),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-transform"),
            ),
        ],
        sse,
    )
        .into_response())
}

async fn write_list(
    broker: &ChangeFeedBroker,
    list_key: &str,
    operation: ListOperation,
    body: &serde_json::Value,
    origin_session_id: Option<String>,
) -> Result<StatusCode, BackendError> {
    broker
        .apply_batch(list_key, operation, body, origin_session_id)
        .await?;
    Ok(StatusCode::OK)
}

// Private list

pub async fn private_stream(
    session: SessionContext,
    State(broker): State<ChangeFeedBroker>,
) -> Result<Response, BackendError> {
    stream_list(&broker, &session.user_name).await
}

pub async fn private_upsert(
    session: SessionContext,
    State(broker): State<ChangeFeedBroker>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    write_list(
        &broker,
        &session.user_name,
        ListOperation::Upsert,
        &body,
        Some(session.session_id),
    )
    .await
}

pub async fn private_delete(
    session: SessionContext,
    State(broker): State<ChangeFeedBroker>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    write_list(
        &broker,
        &session.user_name,
        ListOperation::Delete,
        &body,
        Some(session.session_id),
    )
    .await
}

// Public lists

pub async fn public_stream(
    State(broker): State<ChangeFeedBroker>,
    Path(list_id): Path<String>,
) -> Result<Response, BackendError> {
    stream_list(&broker, &list_id).await
}

pub async fn public_upsert(
    session: Option<SessionContext>,
    State(broker): State<ChangeFeedBroker>,
    Path(list_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    let origin = session.map(|session| session.session_id);
    write_list(&broker, &list_id, ListOperation::Upsert, &body, origin).await
}

pub async fn public_delete(
    session: Option<SessionContext>,
    State(broker): State<ChangeFeedBroker>,
    Path(list_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    let origin = session.map(|session| session.session_id);
    write_list(&broker, &list_id, ListOperation::Delete, &body, origin).await
}

// Directory

pub async fn list_directory(
    session: SessionContext,
    State(directory): State<ListDirectory>,
) -> Result<Json<Vec<ListReference>>, BackendError> {
    Ok(Json(directory.entries(&session.user_name).await?))
}

pub async fn add_to_directory(
    session: SessionContext,
    State(directory): State<ListDirectory>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    let reference = ListReference::from_body(&body)?;
    directory.add(&session.user_name, &reference).await?;
    tracing::info!("[ShoppingList] {} added list {}", session.user_name, reference.id);
    Ok(StatusCode::OK)
}

pub async fn remove_from_directory(
    session: SessionContext,
    State(directory): State<ListDirectory>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, BackendError> {
    let reference = ListReference::from_body(&body)?;
    directory.remove(&session.user_name, &reference).await?;
    tracing::info!("[ShoppingList] {} removed list {}", session.user_name, reference.id);
    Ok(StatusCode::OK)
}
