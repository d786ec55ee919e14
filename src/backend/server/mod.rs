//! Server Module
//!
//! Configuration, application state and startup.
//!
//! # Architecture
//!
//! - **`config`** - `ServerConfig` read from the environment
//! - **`state`** - `AppState` and its `FromRef` implementations
//! - **`init`** - store selection and app creation
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env`
//! 2. **Store Selection**: PostgreSQL and Redis when configured, in-memory otherwise
//! 3. **Background Tasks**: topic cleanup for the in-memory store
//! 4. **Router Creation**: all routes plus request tracing

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::create_app;
pub use state::{AppState, KvBackends};
