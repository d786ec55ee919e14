//! Authentication Module
//!
//! User accounts, session tokens and the HTTP handlers around them.
//!
//! # Architecture
//!
//! - **`users`** - Signup rules, bcrypt hashing, credential checks
//! - **`sessions`** - JWT session tokens and the session cookie
//! - **`handlers`** - HTTP handlers for login, logout, signup and status
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt before storage
//! - Sessions are HS256 JWTs carrying the user name and a per-login session id
//! - Authentication failures expire the session cookie
//! - Unknown users and wrong passwords are indistinguishable to the caller

/// Account rules and credential checks
pub mod users;

/// JWT session tokens
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{login, logout, signup, status, test_uptime};
pub use sessions::{Claims, SessionKeys};
