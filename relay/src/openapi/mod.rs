//! OpenAPI documentation for the relay's HTTP surface.
//!
//! Order records are provider-defined JSON objects, stored and returned verbatim. The types in this
//! module document their known fields; handlers never construct them.

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::api::handlers;
use crate::orders::CreateOrderRequest;

/// An order as reported by the provider. Only `uuid` is guaranteed; other fields are passed through.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "uuid": "0b9c7a9e-5d3e-4c4c-9a9a-2f6b1f0c6a11",
    "status": "received",
    "orderId": "INV-20240309070502",
    "title": "Premium Subscription Box",
    "currency": "TON",
    "captured": false,
    "meta": {"telegram_id": "123456789"}
}))]
pub struct OrderRecordDoc {
    /// Provider-assigned order id; the store key
    pub uuid: String,
    /// One of `created`, `pending`, `processing`, `received`, `captured`, `failed`, `canceled`
    pub status: Option<String>,
    /// Merchant order id sent at creation
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    pub title: Option<String>,
    pub currency: Option<String>,
    pub captured: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub meta: Option<serde_json::Value>,
}

/// Webhook notification envelope.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "event": "order.status.changed",
    "data": {"uuid": "abc", "status": "received"}
}))]
pub struct WebhookEnvelopeDoc {
    /// Event name; only `order.status.changed` is acted on
    pub event: String,
    /// Full order record after the change
    pub data: OrderRecordDoc,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "order-relay",
        description = "Creates orders with the ArcPay API and keeps their status current from signed webhooks."
    ),
    paths(
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::webhooks::receive_webhook,
        handlers::health::healthz,
    ),
    components(schemas(CreateOrderRequest, OrderRecordDoc, WebhookEnvelopeDoc)),
    tags(
        (name = "orders", description = "Order creation and lookup"),
        (name = "webhooks", description = "Provider notifications"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
