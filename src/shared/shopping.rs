//! Shopping List Types
//!
//! Items, change events and list references exchanged over the shopping-list
//! endpoints. Every write carries whole [`ItemRecord`]s; a batch is validated as a
//! unit before anything reaches the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::error::SharedError;

/// Fields every element of a write batch must carry, in the order they are checked
pub const REQUIRED_ITEM_FIELDS: [&str; 5] = ["id", "text", "checked", "position", "addedTime"];

/// A single entry of a shopping list
///
/// Clients render items sorted by `position`; the store keeps no order of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Client-generated item id, unique within one list
    pub id: String,
    /// Display text
    pub text: String,
    /// Whether the item has been ticked off
    pub checked: bool,
    /// Sort key used by clients
    pub position: f64,
    /// When the item was first added
    pub added_time: DateTime<Utc>,
}

/// Mutation applied by a write batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOperation {
    /// Insert or replace each item by id
    Upsert,
    /// Remove each item by id
    Delete,
}

/// Validate a raw request body as a batch of items.
///
/// The body must be a JSON array. Every element is checked for all of
/// [`REQUIRED_ITEM_FIELDS`] before any element is converted, so the error always
/// names the first missing field found in the batch.
pub fn parse_item_batch(body: &Value) -> Result<Vec<ItemRecord>, SharedError> {
    let elements = body
        .as_array()
        .ok_or_else(|| SharedError::validation("body", "Expected an array"))?;

    for element in elements {
        let object = element
            .as_object()
            .ok_or_else(|| SharedError::validation("body", "Each element must be an object"))?;
        if let Some(missing) = REQUIRED_ITEM_FIELDS
            .iter()
            .find(|field| !object.contains_key(**field))
        {
            return Err(SharedError::validation(
                *missing,
                format!("Each element requires {}", missing),
            ));
        }
    }

    elements
        .iter()
        .map(|element| {
            serde_json::from_value::<ItemRecord>(element.clone()).map_err(|err| {
                SharedError::validation("body", format!("Invalid element: {}", err))
            })
        })
        .collect()
}

/// Change notification carried on a list topic
///
/// `data` is the serialized snapshot, forwarded to stream consumers verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// List the snapshot belongs to
    pub list_key: String,
    /// JSON array of every item currently in the list
    pub data: String,
    /// Session that caused the change, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_session_id: Option<String>,
}

impl ChangeEvent {
    /// Build an event carrying a full snapshot of `items`
    pub fn snapshot(
        list_key: impl Into<String>,
        items: &[ItemRecord],
        origin_session_id: Option<String>,
    ) -> Result<Self, SharedError> {
        Ok(Self {
            list_key: list_key.into(),
            data: serde_json::to_string(items)?,
            origin_session_id,
        })
    }

    /// Decode the snapshot back into items
    pub fn items(&self) -> Result<Vec<ItemRecord>, SharedError> {
        Ok(serde_json::from_str(&self.data)?)
    }
}

/// Entry in a user's directory of known shopping lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListReference {
    /// List key; equal to the user name for the private list
    pub id: String,
    /// Display name
    pub name: String,
}

impl ListReference {
    /// The implicit private list of `user_name`
    pub fn private(user_name: &str) -> Self {
        Self {
            id: user_name.to_string(),
            name: "Private".to_string(),
        }
    }

    /// Validate a raw request body as a list reference
    pub fn from_body(body: &Value) -> Result<Self, SharedError> {
        for field in ["id", "name"] {
            if body.get(field).is_none() {
                return Err(SharedError::validation(
                    field,
                    format!("Expected '{}' key", field),
                ));
            }
        }
        serde_json::from_value(body.clone())
            .map_err(|err| SharedError::validation("body", format!("Invalid list: {}", err)))
    }
}
