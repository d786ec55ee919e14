//! Batch property tests
//!
//! Whole-batch validation and last-write-wins on shopping lists.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use recipebook::backend::kv::MemoryKvStore;
use recipebook::backend::shopping::ChangeFeedBroker;
use recipebook::shared::shopping::{parse_item_batch, REQUIRED_ITEM_FIELDS};
use recipebook::shared::ListOperation;
use serde_json::{json, Value};

fn item(id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "text": text,
        "checked": false,
        "position": 1.0,
        "addedTime": "2024-01-01T00:00:00Z",
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn complete_batches_parse(ids in prop::collection::vec("[a-z]{1,6}", 0..8)) {
        let body = Value::Array(ids.iter().map(|id| item(id, "text")).collect());
        let items = parse_item_batch(&body).unwrap();
        prop_assert_eq!(items.len(), ids.len());
    }

    #[test]
    fn a_missing_field_rejects_the_whole_batch(
        size in 1usize..6,
        broken in 0usize..6,
        field in 0usize..REQUIRED_ITEM_FIELDS.len(),
    ) {
        let broken = broken % size;
        let mut elements: Vec<Value> = (0..size).map(|i| item(&i.to_string(), "text")).collect();
        elements[broken]
            .as_object_mut()
            .unwrap()
            .remove(REQUIRED_ITEM_FIELDS[field]);

        let err = parse_item_batch(&Value::Array(elements)).unwrap_err();
        prop_assert_eq!(err.field(), Some(REQUIRED_ITEM_FIELDS[field]));
    }

    #[test]
    fn last_write_to_an_id_wins(writes in prop::collection::vec(("[a-c]", "[a-z]{1,4}"), 1..12)) {
        let broker = ChangeFeedBroker::new(Arc::new(MemoryKvStore::new()));

        let snapshot = runtime().block_on(async {
            for (id, text) in &writes {
                broker
                    .apply_batch("list", ListOperation::Upsert, &json!([item(id, text)]), None)
                    .await
                    .unwrap();
            }
            broker.snapshot("list").await.unwrap()
        });

        let mut expected: HashMap<&str, &str> = HashMap::new();
        for (id, text) in &writes {
            expected.insert(id, text);
        }

        prop_assert_eq!(snapshot.len(), expected.len());
        for record in snapshot {
            prop_assert_eq!(Some(&record.text.as_str()), expected.get(record.id.as_str()));
        }
    }
}
