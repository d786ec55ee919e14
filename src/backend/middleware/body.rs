/**
 * JSON Body Extractor
 *
 * Reads the request body as an untyped `serde_json::Value` so that schema
 * checks happen in the shared validators and produce field-specific messages.
 * Axum's `Json` extractor would reject malformed bodies with its own plain-text
 * responses instead.
 *
 * An empty body becomes `Value::Null`.
 */

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::backend::error::BackendError;

/// Untyped JSON request body
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| BackendError::validation("body", err.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Null));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|err| BackendError::validation("body", format!("Invalid JSON body: {}", err)))
    }
}
