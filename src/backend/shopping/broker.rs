/**
 * Change-Feed Broker
 *
 * Owns shopping-list state and the per-list change topic. Every accepted write
 * batch is applied item by item to the list hash, after which the whole hash is
 * read back and published as one [`ChangeEvent`]. Subscribers never see diffs:
 * each event replaces the client's copy of the list.
 *
 * # Delivery
 *
 * Events go to every open stream on the list, including the stream of the
 * client that made the change. The origin session id is recorded on the event
 * but not used for filtering.
 *
 * # Stream Opening
 *
 * [`ChangeFeedBroker::open_stream`] subscribes to the topic before it reads the
 * initial snapshot. A write that lands between the two steps therefore shows up
 * as a second event instead of being lost.
 *
 * # Concurrency
 *
 * Writers are not serialized against each other. Two batches racing on the same
 * list may publish their snapshots in either order; each snapshot is still a
 * state the hash actually held when it was read.
 */

use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::Value;

use crate::backend::error::BackendError;
use crate::backend::kv::{ListStore, StoreError};
use crate::shared::shopping::parse_item_batch;
use crate::shared::{ChangeEvent, ItemRecord, ListOperation};

/// Lazy, infinite sequence of change events for one list
///
/// The first event is always the current snapshot. Dropping the stream
/// releases the topic subscription.
pub type ChangeStream = BoxStream<'static, ChangeEvent>;

/// Pub/sub topic carrying the change events of `list_key`
pub fn topic_for(list_key: &str) -> String {
    format!("shopping:{}", list_key)
}

/// Per-list publish/subscribe broker over a [`ListStore`]
#[derive(Clone)]
pub struct ChangeFeedBroker {
    store: Arc<dyn ListStore>,
}

impl ChangeFeedBroker {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }

    /// Current items of a list
    ///
    /// Lists that were never written to are empty.
    pub async fn snapshot(&self, list_key: &str) -> Result<Vec<ItemRecord>, BackendError> {
        let values = self.store.item_values(list_key).await?;
        values
            .iter()
            .map(|value| {
                serde_json::from_str::<ItemRecord>(value).map_err(|err| {
                    BackendError::from(StoreError::corrupt(format!(
                        "item in list {}: {}",
                        list_key, err
                    )))
                })
            })
            .collect()
    }

    /// Open a change stream on a list
    ///
    /// Emits the current snapshot first, then every event published on the
    /// list's topic in publication order. Undecodable topic payloads are
    /// skipped.
    pub async fn open_stream(&self, list_key: &str) -> Result<ChangeStream, BackendError> {
        let subscription = self.store.subscribe(&topic_for(list_key)).await?;
        let items = self.snapshot(list_key).await?;
        let initial = ChangeEvent::snapshot(list_key, &items, None)?;

        tracing::info!(
            "[ShoppingList] Stream opened on {} with {} items",
            list_key,
            items.len()
        );

        let key = list_key.to_string();
        let updates = subscription.filter_map(move |payload| {
            let decoded = serde_json::from_str::<ChangeEvent>(&payload);
            let key = key.clone();
            async move {
                match decoded {
                    Ok(event) => Some(event),
                    Err(err) => {
                        tracing::warn!("[ShoppingList] Dropping malformed event on {}: {}", key, err);
                        None
                    }
                }
            }
        });

        Ok(stream::once(async move { initial }).chain(updates).boxed())
    }

    /// Validate a raw body and apply it to a list
    ///
    /// The whole body is validated before the store is touched; a batch with a
    /// missing field anywhere leaves the list unchanged.
    pub async fn apply_batch(
        &self,
        list_key: &str,
        operation: ListOperation,
        body: &Value,
        origin_session_id: Option<String>,
    ) -> Result<ChangeEvent, BackendError> {
        let items = parse_item_batch(body)?;
        self.apply_items(list_key, operation, &items, origin_session_id)
            .await
    }

    /// Apply already-validated items and publish the resulting snapshot
    ///
    /// Items are written one command at a time. A store failure part way
    /// through leaves the earlier items applied and publishes nothing.
    pub async fn apply_items(
        &self,
        list_key: &str,
        operation: ListOperation,
        items: &[ItemRecord],
        origin_session_id: Option<String>,
    ) -> Result<ChangeEvent, BackendError> {
        for item in items {
            match operation {
                ListOperation::Upsert => {
                    let value = serde_json::to_string(item)?;
                    self.store.set_item(list_key, &item.id, value).await?;
                }
                ListOperation::Delete => {
                    self.store.remove_item(list_key, &item.id).await?;
                }
            }
        }

        let current = self.snapshot(list_key).await?;
        let event = ChangeEvent::snapshot(list_key, &current, origin_session_id)?;
        let receivers = self
            .store
            .publish(&topic_for(list_key), serde_json::to_string(&event)?)
            .await?;

        tracing::debug!(
            "[ShoppingList] {:?} of {} items on {}, snapshot of {} sent to {} streams",
            operation,
            items.len(),
            list_key,
            current.len(),
            receivers
        );

        Ok(event)
    }
}
