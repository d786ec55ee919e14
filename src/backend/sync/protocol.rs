/**
 * Checksum Sync Protocol
 *
 * Lets a polling client skip downloading a collection that has not changed
 * since its last poll.
 *
 * # Exchange
 *
 * 1. The client sends the checksum from its previous response, or nothing.
 * 2. The server fingerprints the table. A match ends the exchange with
 *    `204 No Content` and no rows are loaded.
 * 3. Otherwise the scoped rows are loaded and the table is fingerprinted a
 *    second time. The response carries the rows and that second value.
 *
 * If the table changes between loading and the second fingerprint, the
 * client receives a checksum that will not match on its next poll and simply
 * downloads again. No lock is held across the two fingerprints.
 *
 * `-1` is accepted as "no prior state" for clients that cannot omit the
 * parameter.
 */

use std::future::Future;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::backend::error::BackendError;
use crate::backend::kv::StoreError;
use crate::backend::recipes::store::RecipeStore;
use crate::shared::Collection;

/// Checksum value meaning "the client has no copy"
pub const NO_CHECKSUM: i64 = -1;

/// Result of one sync exchange
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome<T> {
    /// The client's copy is current
    Unchanged,
    /// Fresh rows plus the checksum to send next time
    Changed { rows: Vec<T>, checksum: i64 },
}

/// Run one sync exchange for `collection`
///
/// `load` is only called when the client's checksum is stale or absent.
pub async fn sync_collection<T, F, Fut>(
    store: &dyn RecipeStore,
    collection: Collection,
    client_checksum: Option<i64>,
    load: F,
) -> Result<SyncOutcome<T>, BackendError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, StoreError>>,
{
    let known = client_checksum.filter(|checksum| *checksum != NO_CHECKSUM);
    let current = store.fingerprint(collection).await?;

    if known == Some(current) {
        tracing::debug!("[Sync] {} unchanged ({})", collection.name(), current);
        return Ok(SyncOutcome::Unchanged);
    }

    let rows = load().await?;
    let checksum = store.fingerprint(collection).await?;

    tracing::debug!(
        "[Sync] {} sent {} rows, checksum {} -> {}",
        collection.name(),
        rows.len(),
        known.map_or_else(|| "none".to_string(), |value| value.to_string()),
        checksum
    );

    Ok(SyncOutcome::Changed { rows, checksum })
}

/// HTTP form of a sync outcome
///
/// `Unchanged` becomes `204 No Content`; `Changed` becomes
/// `{"<collection>": [...], "checksum": <int>}`.
#[derive(Debug)]
pub struct SyncResponse<T> {
    pub collection: Collection,
    pub outcome: SyncOutcome<T>,
}

impl<T: Serialize> IntoResponse for SyncResponse<T> {
    fn into_response(self) -> Response {
        match self.outcome {
            SyncOutcome::Unchanged => StatusCode::NO_CONTENT.into_response(),
            SyncOutcome::Changed { rows, checksum } => {
                let rows = match serde_json::to_value(rows) {
                    Ok(rows) => rows,
                    Err(err) => return BackendError::from(err).into_response(),
                };
                let mut body = Map::new();
                body.insert(self.collection.name().to_string(), rows);
                body.insert("checksum".to_string(), Value::from(checksum));
                Json(Value::Object(body)).into_response()
            }
        }
    }
}
