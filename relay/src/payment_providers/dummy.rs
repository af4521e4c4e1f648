//! Dummy order provider implementation
//!
//! Fabricates an order record without calling any external service.
//! Useful for local development against the webhook flow.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use crate::{
    config::DummyConfig,
    orders::OrderPayload,
    payment_providers::{OrderProvider, ProviderError, Result},
    types::OrderRecord,
};

/// Dummy provider that accepts every order
pub struct DummyProvider {
    status: String,
}

impl DummyProvider {
    pub fn new(status: impl Into<String>) -> Self {
        Self { status: status.into() }
    }
}

impl From<DummyConfig> for DummyProvider {
    fn from(config: DummyConfig) -> Self {
        Self::new(config.status)
    }
}

#[async_trait]
impl OrderProvider for DummyProvider {
    async fn create_order(&self, order: &OrderPayload) -> Result<OrderRecord> {
        let mut record = serde_json::to_value(order).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if let Value::Object(fields) = &mut record {
            fields.insert("uuid".to_string(), json!(uuid::Uuid::new_v4().to_string()));
            fields.insert("status".to_string(), json!(self.status));
            fields.insert("amount".to_string(), json!(order.total()));
            fields.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));
        }

        let record = OrderRecord::try_from(record).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        tracing::info!("Dummy provider created order {} ({})", record.uuid(), order.order_id);
        Ok(record)
    }

    fn name(&self) -> &'static str {
        "dummy"
    }
}
