/**
 * Authentication Handler Types
 *
 * Request and response bodies for login, signup and status.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::SharedError;

/// Username and password, as sent to both `/login` and `/users`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_body(body: &Value) -> Result<Self, SharedError> {
        let username = string_field(body, "username", "No username provided")?;
        let password = string_field(body, "password", "No password provided")?;
        Ok(Self { username, password })
    }
}

fn string_field(body: &Value, field: &str, missing: &str) -> Result<String, SharedError> {
    match body.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Null) | None => Err(SharedError::validation(field, missing)),
        Some(_) => Err(SharedError::validation(field, format!("'{}' must be a string", field))),
    }
}

/// Returned by a successful login
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub message: String,
    /// Session token, also set as the `session` cookie
    pub token: String,
}

/// Returned by `/status`
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    pub username: String,
    /// Whether the account may create and edit content
    pub write: bool,
}
