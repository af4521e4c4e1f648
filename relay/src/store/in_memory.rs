//! In-memory order store backed by a sharded concurrent map.
//!
//! Lives for the lifetime of the process and is never evicted.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{OrderStore, Result};
use crate::types::{OrderId, OrderRecord};

/// Clone-friendly via Arc; clones share the same table.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<DashMap<OrderId, OrderRecord>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, uuid: &str) -> Result<Option<OrderRecord>> {
        Ok(self.orders.get(uuid).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, record: OrderRecord) -> Result<Option<OrderRecord>> {
        let key = record.uuid().to_string();
        Ok(self.orders.insert(key, record))
    }

    async fn snapshot(&self) -> Result<BTreeMap<OrderId, OrderRecord>> {
        Ok(self
            .orders
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.orders.len())
    }
}
