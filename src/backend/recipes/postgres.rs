/**
 * PostgreSQL Recipe Store
 *
 * `RecipeStore` over a `PgPool`. Scoped reads join the owning user and keep
 * rows whose owner is the requester or shares the requester's group.
 *
 * # Fingerprints
 *
 * Postgres has no table checksum primitive, so the fingerprint is the first
 * 64 bits of an MD5 over the text form of every row in id order. It is
 * recomputed on every call and costs a full table scan.
 */

use async_trait::async_trait;
use sqlx::PgPool;

use super::store::{RecipeStore, Scope, UserRecord};
use crate::backend::kv::StoreError;
use crate::shared::recipes::{CategoryDraft, CommentDraft, CommentEdit, RecipeDraft};
use crate::shared::{Category, Collection, Comment, Recipe, UserSummary};

fn fingerprint_sql(collection: Collection) -> &'static str {
    match collection {
        Collection::Recipes => {
            "SELECT COALESCE(('x' || substr(md5(string_agg(t::text, ',' ORDER BY t.id)), 1, 16))::bit(64)::bigint, 0) FROM recipes t"
        }
        Collection::Categories => {
            "SELECT COALESCE(('x' || substr(md5(string_agg(t::text, ',' ORDER BY t.id)), 1, 16))::bit(64)::bigint, 0) FROM categories t"
        }
        Collection::Comments => {
            "SELECT COALESCE(('x' || substr(md5(string_agg(t::text, ',' ORDER BY t.id)), 1, 16))::bit(64)::bigint, 0) FROM comments t"
        }
        Collection::Users => {
            "SELECT COALESCE(('x' || substr(md5(string_agg(t::text, ',' ORDER BY t.id)), 1, 16))::bit(64)::bigint, 0) FROM users t"
        }
    }
}

const RECIPE_COLUMNS: &str =
    "r.id, r.title, r.category_id, r.ingredients, r.description, r.image, r.date, r.user_id";

const SCOPE_FILTER: &str = "(o.id = $1 OR ($2::BIGINT IS NOT NULL AND o.group_id = $2))";

/// PostgreSQL-backed recipe store
#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and run pending migrations
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        tracing::info!("[Database] Connecting...");
        let pool = PgPool::connect(database_url).await?;

        tracing::info!("[Database] Running migrations...");
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|err| StoreError::unavailable(format!("migration failed: {}", err)))?;

        tracing::info!("[Database] Ready");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn fingerprint(&self, collection: Collection) -> Result<i64, StoreError> {
        let fingerprint: i64 = sqlx::query_scalar(fingerprint_sql(collection))
            .fetch_one(&self.pool)
            .await?;
        Ok(fingerprint)
    }

    async fn find_user(&self, user_name: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, user_name, password_hash, read_only, group_id FROM users WHERE user_name = $1",
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user_name: &str, password_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (user_name, password_hash, read_only) VALUES ($1, $2, FALSE) \
             ON CONFLICT (user_name) DO NOTHING",
        )
        .bind(user_name)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn users(&self, scope: &Scope) -> Result<Vec<UserSummary>, StoreError> {
        let query = format!(
            "SELECT o.id, o.user_name AS \"user\", o.read_only FROM users o WHERE {} ORDER BY o.id",
            SCOPE_FILTER
        );
        let users = sqlx::query_as::<_, UserSummary>(&query)
            .bind(scope.user_id)
            .bind(scope.group_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn recipes(&self, scope: &Scope) -> Result<Vec<Recipe>, StoreError> {
        let query = format!(
            "SELECT {} FROM recipes r JOIN users o ON r.user_id = o.id WHERE {} ORDER BY r.id",
            RECIPE_COLUMNS, SCOPE_FILTER
        );
        let recipes = sqlx::query_as::<_, Recipe>(&query)
            .bind(scope.user_id)
            .bind(scope.group_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(recipes)
    }

    async fn categories(&self, scope: &Scope) -> Result<Vec<Category>, StoreError> {
        let query = format!(
            "SELECT c.id, c.name, c.user_id FROM categories c JOIN users o ON c.user_id = o.id \
             WHERE {} ORDER BY c.id",
            SCOPE_FILTER
        );
        let categories = sqlx::query_as::<_, Category>(&query)
            .bind(scope.user_id)
            .bind(scope.group_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn comments(&self, scope: &Scope) -> Result<Vec<Comment>, StoreError> {
        let query = format!(
            "SELECT c.id, c.text, c.user_id, c.recipe_id, c.date, c.edited_date \
             FROM comments c JOIN users o ON c.user_id = o.id WHERE {} ORDER BY c.id",
            SCOPE_FILTER
        );
        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(scope.user_id)
            .bind(scope.group_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn recipe(&self, scope: &Scope, id: i64) -> Result<Option<Recipe>, StoreError> {
        let query = format!(
            "SELECT {} FROM recipes r JOIN users o ON r.user_id = o.id WHERE {} AND r.id = $3",
            RECIPE_COLUMNS, SCOPE_FILTER
        );
        let recipe = sqlx::query_as::<_, Recipe>(&query)
            .bind(scope.user_id)
            .bind(scope.group_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recipe)
    }

    async fn comment(&self, scope: &Scope, id: i64) -> Result<Option<Comment>, StoreError> {
        let query = format!(
            "SELECT c.id, c.text, c.user_id, c.recipe_id, c.date, c.edited_date \
             FROM comments c JOIN users o ON c.user_id = o.id WHERE {} AND c.id = $3",
            SCOPE_FILTER
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(scope.user_id)
            .bind(scope.group_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn insert_recipe(&self, owner: &Scope, draft: &RecipeDraft) -> Result<Recipe, StoreError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "INSERT INTO recipes (title, category_id, ingredients, description, image, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, title, category_id, ingredients, description, image, date, user_id",
        )
        .bind(&draft.title)
        .bind(draft.category_id)
        .bind(&draft.ingredients)
        .bind(&draft.description)
        .bind(draft.image_name())
        .bind(owner.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(recipe)
    }

    async fn update_recipe(&self, owner: &Scope, id: i64, draft: &RecipeDraft) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE recipes SET title = $1, category_id = $2, ingredients = $3, description = $4, image = $5 \
             WHERE id = $6 AND user_id = $7",
        )
        .bind(&draft.title)
        .bind(draft.category_id)
        .bind(&draft.ingredients)
        .bind(&draft.description)
        .bind(draft.image_name())
        .bind(id)
        .bind(owner.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_recipe(&self, owner: &Scope, id: i64) -> Result<Option<Recipe>, StoreError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "DELETE FROM recipes WHERE id = $1 AND user_id = $2 \
             RETURNING id, title, category_id, ingredients, description, image, date, user_id",
        )
        .bind(id)
        .bind(owner.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(recipe)
    }

    async fn insert_category(&self, owner: &Scope, draft: &CategoryDraft) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar("INSERT INTO categories (name, user_id) VALUES ($1, $2) RETURNING id")
            .bind(&draft.name)
            .bind(owner.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn insert_comment(&self, owner: &Scope, draft: &CommentDraft) -> Result<Comment, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (text, user_id, recipe_id) VALUES ($1, $2, $3) \
             RETURNING id, text, user_id, recipe_id, date, edited_date",
        )
        .bind(&draft.text)
        .bind(owner.user_id)
        .bind(draft.recipe_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn update_comment(&self, owner: &Scope, id: i64, edit: &CommentEdit) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE comments SET text = $1, edited_date = NOW() WHERE id = $2 AND user_id = $3",
        )
        .bind(&edit.text)
        .bind(id)
        .bind(owner.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_comment(&self, owner: &Scope, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
