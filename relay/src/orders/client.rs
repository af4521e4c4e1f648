use chrono::Utc;
use metrics::counter;
use std::sync::Arc;

use crate::{
    config::OrderConfig,
    errors::Result,
    orders::{CreateOrderRequest, OrderPayload},
    payment_providers::OrderProvider,
    store::OrderStore,
    types::OrderRecord,
};

/// Builds orders from the configured template and registers them with the provider.
pub struct OrderClient {
    template: OrderConfig,
    provider: Arc<dyn OrderProvider>,
    store: Arc<dyn OrderStore>,
}

impl OrderClient {
    pub fn new(template: OrderConfig, provider: Arc<dyn OrderProvider>, store: Arc<dyn OrderStore>) -> Self {
        Self {
            template,
            provider,
            store,
        }
    }

    /// Create an order with the provider and record it locally.
    ///
    /// The provider's record is stored under its `uuid` so later status notifications replace it.
    pub async fn create(&self, request: CreateOrderRequest) -> Result<OrderRecord> {
        let order = OrderPayload::build(&self.template, request, Utc::now());
        tracing::debug!(order_id = %order.order_id, provider = self.provider.name(), "Creating order");

        let record = self.provider.create_order(&order).await?;
        self.store.upsert(record.clone()).await?;

        counter!("relay_orders_created_total", "provider" => self.provider.name()).increment(1);
        tracing::info!(order_id = %order.order_id, uuid = %record.uuid(), "Order created");

        Ok(record)
    }
}
