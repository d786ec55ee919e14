/**
 * Shopping-List Routes
 *
 * - `GET|POST|PUT|DELETE /shoppingList` - the caller's private list
 * - `GET|POST|PUT|DELETE /shoppingLists/{list_id}` - a public list
 * - `GET|POST|DELETE /shoppingLists` - the caller's list directory
 */

use axum::{routing::get, Router};

use crate::backend::server::state::AppState;
use crate::backend::shopping::handlers::{
    add_to_directory, list_directory, private_delete, private_stream, private_upsert,
    public_delete, public_stream, public_upsert, remove_from_directory,
};

pub fn configure_shopping_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/shoppingList",
            get(private_stream)
                .post(private_upsert)
                .put(private_upsert)
                .delete(private_delete),
        )
        .route(
            "/shoppingLists",
            get(list_directory)
                .post(add_to_directory)
                .delete(remove_from_directory),
        )
        .route(
            "/shoppingLists/{list_id}",
            get(public_stream)
                .post(public_upsert)
                .put(public_upsert)
                .delete(public_delete),
        )
}
