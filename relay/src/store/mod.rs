//! Order store abstraction.
//!
//! Handlers never touch a map directly: they go through [`OrderStore`], which is injected into
//! [`crate::AppState`]. The only implementation today is [`InMemoryOrderStore`]; a persistent
//! backend can be dropped in without changing any handler.
//!
//! Writes are last-write-wins per `uuid`. There is no versioning, and two concurrent writes for the
//! same order are ordered by completion, not arrival.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::types::{OrderId, OrderRecord};

mod in_memory;

pub use in_memory::InMemoryOrderStore;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing storage failed. Never produced by the in-memory store.
    #[error("order storage failure: {0}")]
    Backend(String),
}

/// Storage for the latest known version of every order.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch the current record for an order.
    async fn get(&self, uuid: &str) -> Result<Option<OrderRecord>>;

    /// Insert or replace the record stored under `record.uuid()`.
    ///
    /// Returns the record that was replaced, if any.
    async fn upsert(&self, record: OrderRecord) -> Result<Option<OrderRecord>>;

    /// Copy of every stored record, ordered by uuid.
    async fn snapshot(&self) -> Result<BTreeMap<OrderId, OrderRecord>>;

    async fn len(&self) -> Result<usize>;
}
