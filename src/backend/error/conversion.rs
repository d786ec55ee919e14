/**
 * Error Conversion
 *
 * This module provides conversion implementations for backend errors,
 * allowing them to be returned directly from axum handlers.
 *
 * # Response Format
 *
 * Error responses are returned as JSON with the following structure:
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 400
 * }
 * ```
 *
 * Authentication failures additionally expire the session cookie so that a
 * stale identity is not presented again.
 */

use axum::{
    response::{Response, IntoResponse},
    http::{header, HeaderValue, StatusCode},
    body::Body,
};
use crate::backend::auth::sessions::expired_session_cookie;
use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("[Backend] {} ({})", message, status);
        } else {
            tracing::debug!("[Backend] {} ({})", message, status);
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        let mut response = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Body::from("Internal Server Error"));
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            });

        if self.clears_session() {
            if let Ok(cookie) = HeaderValue::from_str(&expired_session_cookie()) {
                response.headers_mut().insert(header::SET_COOKIE, cookie);
            }
        }

        response
    }
}
