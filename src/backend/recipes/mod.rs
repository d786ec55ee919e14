//! Recipes Module
//!
//! Relational data of the recipe book: users, recipes, categories and
//! comments, all filtered through the requester's group scope.
//!
//! # Architecture
//!
//! - **`store`** - `RecipeStore` trait, `UserRecord`, `Scope`
//! - **`memory`** - in-process store used without `DATABASE_URL` and in tests
//! - **`postgres`** - sqlx store with migrations
//! - **`handlers`** - create and single-entity routes, shared snapshots

/// Store trait and scoping
pub mod store;

/// In-memory store
pub mod memory;

/// PostgreSQL store
pub mod postgres;

/// HTTP handlers
pub mod handlers;

pub use memory::MemoryRecipeStore;
pub use postgres::PgRecipeStore;
pub use store::{RecipeStore, Scope, UserRecord};
