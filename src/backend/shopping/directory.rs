/**
 * Shopping-List Directory
 *
 * Per-user record of the lists a user has opened, most recent first. The
 * directory is bookkeeping for clients only: it grants no access, and public
 * lists stay reachable by key whether or not they appear here.
 */

use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::kv::ListStore;
use crate::shared::ListReference;

#[derive(Clone)]
pub struct ListDirectory {
    store: Arc<dyn ListStore>,
}

impl ListDirectory {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }

    /// Entries of `user_name`'s directory
    ///
    /// An empty directory is seeded with the user's private list first.
    pub async fn entries(&self, user_name: &str) -> Result<Vec<ListReference>, BackendError> {
        let mut raw = self.store.directory(user_name).await?;
        if raw.is_empty() {
            let private = serde_json::to_string(&ListReference::private(user_name))?;
            self.store.push_directory_entry(user_name, private).await?;
            raw = self.store.directory(user_name).await?;
        }

        Ok(raw
            .iter()
            .filter_map(|entry| match serde_json::from_str::<ListReference>(entry) {
                Ok(reference) => Some(reference),
                Err(err) => {
                    tracing::warn!("[ShoppingList] Skipping bad directory entry for {}: {}", user_name, err);
                    None
                }
            })
            .collect())
    }

    /// Add `reference`, or move it to the front if already present
    pub async fn add(&self, user_name: &str, reference: &ListReference) -> Result<(), BackendError> {
        let entry = serde_json::to_string(reference)?;
        self.store.push_directory_entry(user_name, entry).await?;
        Ok(())
    }

    pub async fn remove(&self, user_name: &str, reference: &ListReference) -> Result<(), BackendError> {
        let entry = serde_json::to_string(reference)?;
        self.store.remove_directory_entry(user_name, &entry).await?;
        Ok(())
    }
}
