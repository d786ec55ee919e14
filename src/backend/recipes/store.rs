/**
 * Recipe Store Interface
 *
 * The relational side of the backend: users, recipes, categories and
 * comments, plus a per-table fingerprint for the checksum sync protocol.
 *
 * # Scoping
 *
 * Every read takes the requester's [`Scope`]. A row is visible when its owner
 * shares the requester's group, or when the requester owns it. Users without a
 * group only ever see their own rows.
 *
 * Writes on existing rows (update, delete) are narrower: only the owner may
 * change a row, even inside a shared group.
 */

use async_trait::async_trait;
use serde::Serialize;

use crate::backend::kv::StoreError;
use crate::shared::recipes::{CategoryDraft, CommentDraft, CommentEdit, RecipeDraft};
use crate::shared::{Category, Collection, Comment, Recipe, UserSummary};

/// A user row as stored, including the credential hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub user_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub read_only: bool,
    pub group_id: Option<i64>,
}

impl UserRecord {
    pub fn scope(&self) -> Scope {
        Scope {
            user_id: self.id,
            group_id: self.group_id,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            user: self.user_name.clone(),
            read_only: self.read_only,
        }
    }
}

/// Visibility boundary of one requester
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub user_id: i64,
    pub group_id: Option<i64>,
}

impl Scope {
    /// Whether a row owned by `owner_id` (in `owner_group`) is visible
    pub fn can_see(&self, owner_id: i64, owner_group: Option<i64>) -> bool {
        if owner_id == self.user_id {
            return true;
        }
        matches!((self.group_id, owner_group), (Some(mine), Some(theirs)) if mine == theirs)
    }
}

/// Relational store with group scoping and table fingerprints
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Deterministic fingerprint over every row of a table
    ///
    /// Changes whenever any row of the table changes. Not scoped: the value
    /// is the same for every requester.
    async fn fingerprint(&self, collection: Collection) -> Result<i64, StoreError>;

    async fn find_user(&self, user_name: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a writable user without a group
    ///
    /// Returns `false` when the user name is taken.
    async fn create_user(&self, user_name: &str, password_hash: &str) -> Result<bool, StoreError>;

    async fn users(&self, scope: &Scope) -> Result<Vec<UserSummary>, StoreError>;

    async fn recipes(&self, scope: &Scope) -> Result<Vec<Recipe>, StoreError>;

    async fn categories(&self, scope: &Scope) -> Result<Vec<Category>, StoreError>;

    async fn comments(&self, scope: &Scope) -> Result<Vec<Comment>, StoreError>;

    async fn recipe(&self, scope: &Scope, id: i64) -> Result<Option<Recipe>, StoreError>;

    async fn comment(&self, scope: &Scope, id: i64) -> Result<Option<Comment>, StoreError>;

    async fn insert_recipe(&self, owner: &Scope, draft: &RecipeDraft) -> Result<Recipe, StoreError>;

    /// Returns `false` when no recipe with `id` is owned by `owner`
    async fn update_recipe(&self, owner: &Scope, id: i64, draft: &RecipeDraft) -> Result<bool, StoreError>;

    /// Delete an owned recipe, returning the removed row
    async fn delete_recipe(&self, owner: &Scope, id: i64) -> Result<Option<Recipe>, StoreError>;

    /// Returns the new category id
    async fn insert_category(&self, owner: &Scope, draft: &CategoryDraft) -> Result<i64, StoreError>;

    async fn insert_comment(&self, owner: &Scope, draft: &CommentDraft) -> Result<Comment, StoreError>;

    async fn update_comment(&self, owner: &Scope, id: i64, edit: &CommentEdit) -> Result<bool, StoreError>;

    async fn delete_comment(&self, owner: &Scope, id: i64) -> Result<bool, StoreError>;
}
