//! Recipe Collection Types
//!
//! Rows of the four synchronized collections and the request bodies that create
//! or edit them. Rows serialize with camelCase keys, matching what clients cache
//! between checksum polls.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::error::SharedError;

/// The collections that support checksum sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Recipes,
    Categories,
    Comments,
    Users,
}

impl Collection {
    /// Key under which the rows appear in a sync response
    pub fn name(&self) -> &'static str {
        match self {
            Self::Recipes => "recipes",
            Self::Categories => "categories",
            Self::Comments => "comments",
            Self::Users => "users",
        }
    }
}

/// A recipe row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub category_id: i64,
    pub ingredients: String,
    pub description: String,
    /// Image file name, empty when the recipe has none
    pub image: String,
    pub date: DateTime<Utc>,
    pub user_id: i64,
}

/// A category row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// A comment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub user_id: i64,
    pub recipe_id: i64,
    pub date: DateTime<Utc>,
    pub edited_date: Option<DateTime<Utc>>,
}

/// Public view of a user row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub user: String,
    pub read_only: bool,
}

/// Body of recipe create and update requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    pub category_id: i64,
    pub ingredients: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl RecipeDraft {
    pub fn from_body(body: &Value) -> Result<Self, SharedError> {
        parse_body(
            body,
            &[
                ("title", "No title provided"),
                ("categoryId", "No category provided"),
                ("ingredients", "No ingredients provided"),
                ("description", "No description provided"),
            ],
        )
    }

    /// Image name to store, empty when absent
    pub fn image_name(&self) -> String {
        self.image.clone().unwrap_or_default()
    }
}

/// Body of category create requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
}

impl CategoryDraft {
    pub fn from_body(body: &Value) -> Result<Self, SharedError> {
        parse_body(body, &[("name", "No name provided")])
    }
}

/// Body of comment create requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub text: String,
    pub recipe_id: i64,
}

impl CommentDraft {
    pub fn from_body(body: &Value) -> Result<Self, SharedError> {
        parse_body(
            body,
            &[("text", "No text provided"), ("recipeId", "No recipe provided")],
        )
    }
}

/// Body of comment edit requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentEdit {
    pub text: String,
}

impl CommentEdit {
    pub fn from_body(body: &Value) -> Result<Self, SharedError> {
        parse_body(body, &[("text", "No text provided")])
    }
}

/// Check required keys in order, then convert.
fn parse_body<T: DeserializeOwned>(
    body: &Value,
    required: &[(&str, &str)],
) -> Result<T, SharedError> {
    for (field, message) in required {
        if body.get(*field).map_or(true, Value::is_null) {
            return Err(SharedError::validation(*field, *message));
        }
    }
    serde_json::from_value(body.clone())
        .map_err(|err| SharedError::validation("body", format!("Invalid request body: {}", err)))
}
