/**
 * Session Status Handlers
 *
 * `GET /status` reports who the session belongs to and whether the account
 * may write. `GET /test-uptime` is the monitoring check: it requires a valid
 * session (which exercises the user table) and pings the key-value store.
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::StatusResponse;
use crate::backend::error::BackendError;
use crate::backend::kv::ListStore;
use crate::backend::middleware::Requester;

pub async fn status(requester: Requester) -> Json<StatusResponse> {
    Json(StatusResponse {
        write: requester.can_write(),
        username: requester.user.user_name,
    })
}

pub async fn test_uptime(
    _requester: Requester,
    State(lists): State<Arc<dyn ListStore>>,
) -> Result<StatusCode, BackendError> {
    lists.ping().await?;
    Ok(StatusCode::OK)
}
