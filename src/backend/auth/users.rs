/**
 * User Accounts
 *
 * Credential checks and registration on top of the recipe store's user table.
 * Password hashes are bcrypt; hashing and verification run on the blocking
 * pool because a single bcrypt round can take tens of milliseconds.
 */

use crate::backend::error::BackendError;
use crate::backend::recipes::store::{RecipeStore, UserRecord};

/// Minimum user name length, in characters
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Check signup input before touching the store
pub fn validate_signup(username: &str, password: &str) -> Result<(), BackendError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(BackendError::validation(
            "username",
            format!("The username is too short ({} chars minimum).", MIN_USERNAME_LEN),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BackendError::validation(
            "password",
            format!("The password is too short ({} chars minimum).", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

/// Hash a password with the given bcrypt cost
pub async fn hash_password(password: &str, cost: u32) -> Result<String, BackendError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| BackendError::internal(format!("hashing task failed: {}", err)))?
        .map_err(|err| BackendError::internal(format!("password hashing failed: {}", err)))
}

/// Check a password against a stored hash
///
/// Malformed hashes count as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, BackendError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| BackendError::internal(format!("verification task failed: {}", err)))?;

    match outcome {
        Ok(valid) => Ok(valid),
        Err(err) => {
            tracing::warn!("[Auth] Unusable password hash: {}", err);
            Ok(false)
        }
    }
}

/// Resolve a user by credentials
///
/// Unknown users and wrong passwords fail identically.
pub async fn authenticate(
    store: &dyn RecipeStore,
    username: &str,
    password: &str,
) -> Result<UserRecord, BackendError> {
    let user = store.find_user(username).await?.ok_or_else(|| {
        tracing::info!("[Auth] Unknown user: {}", username);
        BackendError::auth("Unauthorized access")
    })?;

    if !verify_password(password, &user.password_hash).await? {
        tracing::info!("[Auth] Wrong password for: {}", username);
        return Err(BackendError::auth("Unauthorized access"));
    }

    Ok(user)
}

/// Register a new writable account without a group
pub async fn register(
    store: &dyn RecipeStore,
    username: &str,
    password: &str,
    cost: u32,
) -> Result<(), BackendError> {
    validate_signup(username, password)?;

    let hash = hash_password(password, cost).await?;
    if !store.create_user(username, &hash).await? {
        return Err(BackendError::conflict(
            "The username already exists, try another one.",
        ));
    }

    tracing::info!("[Auth] Registered user: {}", username);
    Ok(())
}
