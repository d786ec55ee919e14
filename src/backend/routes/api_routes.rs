/**
 * API Route Handlers
 *
 * Session, recipe book and push routes.
 *
 * # Routes
 *
 * ## Sessions
 * - `POST /login`, `GET /logout`, `GET /status`, `POST /users` (signup)
 * - `GET /test-uptime`
 *
 * ## Recipe book
 * - `GET|POST /recipes`, `GET|PUT|DELETE /recipes/{id}`
 * - `GET|POST /categories`
 * - `GET|POST /comments`, `GET|PUT|DELETE /comments/{id}`
 * - `GET /users`
 * - `POST /uniqueRecipes`, `GET /uniqueRecipes/{id}`
 * - `POST /images`, `GET|DELETE /images/{name}`
 *
 * ## Push
 * - `POST /subscriptions/`, `GET /webpush_public_key`
 */

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::backend::auth::{login, logout, signup, status, test_uptime};
use crate::backend::images::handlers::{delete_image, get_image, upload_image};
use crate::backend::notifications::handlers::{public_key, subscribe};
use crate::backend::recipes::handlers::{
    create_category, create_comment, create_recipe, delete_comment, delete_recipe, get_comment,
    get_recipe, get_shared_recipe, share_recipe, update_comment, update_recipe,
};
use crate::backend::server::state::AppState;
use crate::backend::sync::handlers::{sync_categories, sync_comments, sync_recipes, sync_users};

/// Largest accepted image upload
const MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;

/// Configure session and recipe book routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Sessions
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/status", get(status))
        .route("/test-uptime", get(test_uptime))
        .route("/users", get(sync_users).post(signup))
        // Recipes
        .route("/recipes", get(sync_recipes).post(create_recipe))
        .route(
            "/recipes/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/categories", get(sync_categories).post(create_category))
        .route("/comments", get(sync_comments).post(create_comment))
        .route(
            "/comments/{id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route("/uniqueRecipes", post(share_recipe))
        .route("/uniqueRecipes/{id}", get(get_shared_recipe))
        // Images
        .route(
            "/images",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/images/{name}", get(get_image).delete(delete_image))
        // Push
        .route("/subscriptions/", post(subscribe))
        .route("/webpush_public_key", get(public_key))
}
