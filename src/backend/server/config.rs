/**
 * Server Configuration
 *
 * Settings are read from environment variables (after `.env` is loaded by the
 * binary). Only malformed values are errors: every backing service is
 * optional, and a missing URL makes the server fall back to an in-process
 * store with a warning.
 *
 * | Variable               | Default                 |
 * |------------------------|-------------------------|
 * | `SERVER_PORT`          | 3000                    |
 * | `DATABASE_URL`         | in-memory recipe store  |
 * | `REDIS_URL`            | in-memory list store    |
 * | `JWT_SECRET`           | development secret      |
 * | `SESSION_DAYS`         | 365                     |
 * | `PUSH_PUBLIC_KEY`      | push key route 404s     |
 * | `PUSH_PRIVATE_KEY_PEM` | push delivery disabled  |
 * | `PUSH_CONTACT`         | `mailto:admin@localhost`|
 * | `IMAGE_FOLDER`         | `../images/`            |
 * | `BCRYPT_COST`          | bcrypt default cost     |
 */

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_DAYS: u64 = 365;
const DEFAULT_IMAGE_FOLDER: &str = "../images/";
const DEFAULT_PUSH_CONTACT: &str = "mailto:admin@localhost";
const DEVELOPMENT_SECRET: &str = "recipebook-development-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: String, value: String },
}

/// Web push settings
#[derive(Debug, Clone, Default)]
pub struct PushConfig {
    /// Application server key handed to browsers
    pub public_key: Option<String>,
    /// PEM-encoded P-256 private key used to sign VAPID tokens
    pub private_key_pem: Option<String>,
    pub contact: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub session_days: u64,
    pub push: PushConfig,
    pub image_folder: PathBuf,
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("[Config] JWT_SECRET not set, using the development secret");
            DEVELOPMENT_SECRET.to_string()
        });

        Ok(Self {
            port: parse_or(get("SERVER_PORT"), "SERVER_PORT", DEFAULT_PORT)?,
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
            jwt_secret,
            session_days: parse_or(get("SESSION_DAYS"), "SESSION_DAYS", DEFAULT_SESSION_DAYS)?,
            push: PushConfig {
                public_key: get("PUSH_PUBLIC_KEY"),
                private_key_pem: get("PUSH_PRIVATE_KEY_PEM"),
                contact: get("PUSH_CONTACT").unwrap_or_else(|| DEFAULT_PUSH_CONTACT.to_string()),
            },
            image_folder: get("IMAGE_FOLDER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_FOLDER)),
            bcrypt_cost: parse_or(get("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, name: &str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value: raw,
        }),
    }
}
