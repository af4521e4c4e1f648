//! Outbound order payload, in the provider's wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{LineItemConfig, OrderConfig};

/// Body accepted by `POST /create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Telegram user the order is created for
    #[serde(default)]
    pub telegram_id: Option<String>,
}

/// Order as sent to the provider's create endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub title: String,
    /// Merchant-side order id, e.g. `INV-20240101120000`
    pub order_id: String,
    pub currency: String,
    pub items: Vec<LineItem>,
    pub meta: OrderMeta,
    pub captured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub count: u32,
    pub item_id: String,
}

/// Merchant metadata. Serialized as `telegram_id` even when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderMeta {
    pub telegram_id: Option<String>,
}

impl From<&LineItemConfig> for LineItem {
    fn from(item: &LineItemConfig) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            price: item.price,
            count: item.count,
            item_id: item.item_id.clone(),
        }
    }
}

/// Merchant order id: prefix followed by the UTC time to the second.
pub fn merchant_order_id(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}{}", prefix, now.format("%Y%m%d%H%M%S"))
}

impl OrderPayload {
    /// Build an order from the configured template.
    pub fn build(template: &OrderConfig, request: CreateOrderRequest, now: DateTime<Utc>) -> Self {
        Self {
            title: template.title.clone(),
            order_id: merchant_order_id(&template.id_prefix, now),
            currency: template.currency.clone(),
            items: template.items.iter().map(LineItem::from).collect(),
            meta: OrderMeta {
                telegram_id: request.telegram_id,
            },
            captured: false,
        }
    }

    /// Sum of `price * count` over all items.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price * f64::from(item.count)).sum()
    }
}
