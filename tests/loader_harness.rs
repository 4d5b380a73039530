//! Object loader integration harness.
//!
//! # What this covers
//!
//! - A single JSON object (not wrapped in an array) is treated as a
//!   one-element array.
//! - Row-level validation failures are silently dropped; only the surviving
//!   rows are returned.
//! - A malformed payload is a fatal, per-object `LoadError::Decode`.
//! - A transport failure surfaces as `LoadError::Transport`.
//!
//! # Running
//!
//! ```sh
//! cargo test --test loader_harness
//! ```

mod common;
use common::*;

use std::sync::Arc;

use trade_index::LoadError;
use ti_ingest::testing::InMemoryObjectStore;

#[tokio::test]
async fn single_object_is_treated_as_one_element_array() {
    let store = InMemoryObjectStore::new(10);
    store.put("k1", OBJECT_SINGLE);

    let entries = trade_index::load_object("k1", &store).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, "exA");
}

#[tokio::test]
async fn array_payload_loads_every_valid_row() {
    let store = InMemoryObjectStore::new(10);
    store.put("k1", OBJECT_VALID_ARRAY);

    let entries = trade_index::load_object("k1", &store).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_entries_sorted!(entries);
}

#[tokio::test]
async fn mixed_validity_array_keeps_only_valid_rows() {
    let store = InMemoryObjectStore::new(10);
    store.put("k1", OBJECT_MIXED_VALIDITY);

    let entries = trade_index::load_object("k1", &store).await.unwrap();
    let sources: Vec<&str> = entries.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["A", "D"]);
}

#[tokio::test]
async fn malformed_payload_is_a_fatal_decode_error() {
    let store = InMemoryObjectStore::new(10);
    store.put("k1", OBJECT_MALFORMED);

    let result = trade_index::load_object("k1", &store).await;
    assert!(matches!(result, Err(LoadError::Decode(_))));
}

#[tokio::test]
async fn transport_failure_surfaces_as_transport_error() {
    let store = Arc::new(InMemoryObjectStore::new(10));
    store.put("k1", OBJECT_VALID_ARRAY);
    store.fail_get("k1");

    let result = trade_index::load_object("k1", store.as_ref()).await;
    assert!(matches!(result, Err(LoadError::Transport(_))));
}
