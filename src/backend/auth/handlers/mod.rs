//! Authentication Handlers Module
//!
//! HTTP handlers for the session endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── signup.rs   - POST /users
//! ├── login.rs    - POST /login, GET /logout
//! └── status.rs   - GET /status, GET /test-uptime
//! ```
//!
//! # Session Flow
//!
//! 1. **Signup**: username and password → account created (not logged in)
//! 2. **Login**: credentials verified → fresh session id → token in body and cookie
//! 3. **Status**: token verified → `{username, write}`
//! 4. **Logout**: cookie expired

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login and logout handlers
pub mod login;

/// Status and uptime handlers
pub mod status;

pub use login::{login, logout};
pub use signup::signup;
pub use status::{status, test_uptime};
