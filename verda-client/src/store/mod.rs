//! Document store — async key → JSON-document persistence
//!
//! The system boundary of the whole client is this key space: every
//! aggregate (cart, order list, address list) is one JSON document under
//! one key. The store applies a single key's write atomically but offers no
//! cross-key transactions, no locking and no versioning.
//!
//! | Key | Document |
//! |-----|----------|
//! | `cart:{user_id}` | `{ items, total_amount, total_discount, last_modified }` |
//! | `orders:{user_id}` | `{ orders, order_seq, last_modified }` |
//! | `addresses:{user_id}` | `{ addresses, default_address_id, last_modified }` |

mod redb_store;

pub use redb_store::{RedbStore, StoreError};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::AppResult;

/// Key for a user's cart document
pub fn cart_key(user_id: &str) -> String {
    format!("cart:{user_id}")
}

/// Key for a user's order-list document
pub fn orders_key(user_id: &str) -> String {
    format!("orders:{user_id}")
}

/// Key for a user's address-list document
pub fn addresses_key(user_id: &str) -> String {
    format!("addresses:{user_id}")
}

/// Asynchronous key → JSON-document store
///
/// A write replaces the entire document under its key atomically. Nothing
/// coordinates writes across keys or across callers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the document stored under `key`
    async fn get(&self, key: &str) -> AppResult<Option<Value>>;

    /// Atomically replace the document stored under `key`
    async fn set(&self, key: &str, document: Value) -> AppResult<()>;

    /// Delete the document stored under `key` (absent key is a no-op)
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// All keys currently present, in key order (diagnostics)
    async fn keys(&self) -> AppResult<Vec<String>>;
}

/// Read and decode a typed document
pub async fn read_document<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    key: &str,
) -> AppResult<Option<T>> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Encode and write a typed document
pub async fn write_document<T: Serialize>(
    store: &dyn DocumentStore,
    key: &str,
    document: &T,
) -> AppResult<()> {
    let value = serde_json::to_value(document)?;
    store.set(key, value).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced_per_user() {
        assert_eq!(cart_key("u1"), "cart:u1");
        assert_eq!(orders_key("u1"), "orders:u1");
        assert_eq!(addresses_key("u2"), "addresses:u2");
        assert_ne!(cart_key("u1"), cart_key("u2"));
    }
}
