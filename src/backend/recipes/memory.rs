/**
 * In-Memory Recipe Store
 *
 * Process-local tables used when no database is configured and by the test
 * suite. Rows are kept in `BTreeMap`s keyed by id so every listing comes back
 * in id order, which is also the order fingerprints are computed in.
 *
 * # Fingerprints
 *
 * A table fingerprint is the first eight bytes of a BLAKE3 hash over the JSON
 * form of every row. Empty tables fingerprint to `0`.
 */

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;

use super::store::{RecipeStore, Scope, UserRecord};
use crate::backend::kv::StoreError;
use crate::shared::recipes::{CategoryDraft, CommentDraft, CommentEdit, RecipeDraft};
use crate::shared::{Category, Collection, Comment, Recipe, UserSummary};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, UserRecord>,
    recipes: BTreeMap<i64, Recipe>,
    categories: BTreeMap<i64, Category>,
    comments: BTreeMap<i64, Comment>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn visible(&self, scope: &Scope, owner_id: i64) -> bool {
        let owner_group = self.users.get(&owner_id).and_then(|user| user.group_id);
        scope.can_see(owner_id, owner_group)
    }
}

/// Hash `rows` into a fingerprint
fn fingerprint_rows<'a, T, I>(rows: I) -> Result<i64, StoreError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut hasher = blake3::Hasher::new();
    let mut empty = true;
    for row in rows {
        let bytes = serde_json::to_vec(row).map_err(|err| StoreError::corrupt(err.to_string()))?;
        hasher.update(&bytes);
        hasher.update(b"\n");
        empty = false;
    }
    if empty {
        return Ok(0);
    }

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
    Ok(i64::from_le_bytes(prefix))
}

/// In-process relational store
#[derive(Default)]
pub struct MemoryRecipeStore {
    tables: RwLock<Tables>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing signup rules
    pub async fn add_user(
        &self,
        user_name: &str,
        password_hash: &str,
        read_only: bool,
        group_id: Option<i64>,
    ) -> UserRecord {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let user = UserRecord {
            id,
            user_name: user_name.to_string(),
            password_hash: password_hash.to_string(),
            read_only,
            group_id,
        };
        tables.users.insert(id, user.clone());
        user
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn fingerprint(&self, collection: Collection) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        match collection {
            Collection::Recipes => fingerprint_rows(tables.recipes.values()),
            Collection::Categories => fingerprint_rows(tables.categories.values()),
            Collection::Comments => fingerprint_rows(tables.comments.values()),
            Collection::Users => fingerprint_rows(tables.users.values()),
        }
    }

    async fn find_user(&self, user_name: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.user_name == user_name)
            .cloned())
    }

    async fn create_user(&self, user_name: &str, password_hash: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|user| user.user_name == user_name) {
            return Ok(false);
        }
        let id = tables.next_id();
        tables.users.insert(
            id,
            UserRecord {
                id,
                user_name: user_name.to_string(),
                password_hash: password_hash.to_string(),
                read_only: false,
                group_id: None,
            },
        );
        Ok(true)
    }

    async fn users(&self, scope: &Scope) -> Result<Vec<UserSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|user| scope.can_see(user.id, user.group_id))
            .map(UserRecord::summary)
            .collect())
    }

    async fn recipes(&self, scope: &Scope) -> Result<Vec<Recipe>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .filter(|recipe| tables.visible(scope, recipe.user_id))
            .cloned()
            .collect())
    }

    async fn categories(&self, scope: &Scope) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .filter(|category| tables.visible(scope, category.user_id))
            .cloned()
            .collect())
    }

    async fn comments(&self, scope: &Scope) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|comment| tables.visible(scope, comment.user_id))
            .cloned()
            .collect())
    }

    async fn recipe(&self, scope: &Scope, id: i64) -> Result<Option<Recipe>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .get(&id)
            .filter(|recipe| tables.visible(scope, recipe.user_id))
            .cloned())
    }

    async fn comment(&self, scope: &Scope, id: i64) -> Result<Option<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&id)
            .filter(|comment| tables.visible(scope, comment.user_id))
            .cloned())
    }

    async fn insert_recipe(&self, owner: &Scope, draft: &RecipeDraft) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let recipe = Recipe {
            id,
            title: draft.title.clone(),
            category_id: draft.category_id,
            ingredients: draft.ingredients.clone(),
            description: draft.description.clone(),
            image: draft.image_name(),
            date: Utc::now(),
            user_id: owner.user_id,
        };
        tables.recipes.insert(id, recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(&self, owner: &Scope, id: i64, draft: &RecipeDraft) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.recipes.get_mut(&id) {
            Some(recipe) if recipe.user_id == owner.user_id => {
                recipe.title = draft.title.clone();
                recipe.category_id = draft.category_id;
                recipe.ingredients = draft.ingredients.clone();
                recipe.description = draft.description.clone();
                recipe.image = draft.image_name();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_recipe(&self, owner: &Scope, id: i64) -> Result<Option<Recipe>, StoreError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .recipes
            .get(&id)
            .is_some_and(|recipe| recipe.user_id == owner.user_id);
        if !owned {
            return Ok(None);
        }
        tables.comments.retain(|_, comment| comment.recipe_id != id);
        Ok(tables.recipes.remove(&id))
    }

    async fn insert_category(&self, owner: &Scope, draft: &CategoryDraft) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.categories.insert(
            id,
            Category {
                id,
                name: draft.name.clone(),
                user_id: owner.user_id,
            },
        );
        Ok(id)
    }

    async fn insert_comment(&self, owner: &Scope, draft: &CommentDraft) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let comment = Comment {
            id,
            text: draft.text.clone(),
            user_id: owner.user_id,
            recipe_id: draft.recipe_id,
            date: Utc::now(),
            edited_date: None,
        };
        tables.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, owner: &Scope, id: i64, edit: &CommentEdit) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.comments.get_mut(&id) {
            Some(comment) if comment.user_id == owner.user_id => {
                comment.text = edit.text.clone();
                comment.edited_date = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_comment(&self, owner: &Scope, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .comments
            .get(&id)
            .is_some_and(|comment| comment.user_id == owner.user_id);
        if owned {
            tables.comments.remove(&id);
        }
        Ok(owned)
    }
}
