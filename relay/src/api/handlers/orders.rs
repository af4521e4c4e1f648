//! HTTP handlers for order creation and order store reads.

use axum::{
    Json,
    extract::{Path, State},
};
use bytes::Bytes;
use std::collections::BTreeMap;

use crate::{
    AppState,
    errors::{Error, Result},
    orders::CreateOrderRequest,
    types::{OrderId, OrderRecord},
};

/// An empty body is treated as `{}`; anything else must be a JSON object.
fn parse_create_request(body: &[u8]) -> Result<CreateOrderRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateOrderRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| Error::MalformedPayload { message: e.to_string() })
}

#[utoipa::path(
    post,
    path = "/create",
    tag = "orders",
    summary = "Create order",
    description = "Builds an order from the configured template, registers it with the payment provider and stores the provider's record under its `uuid`.",
    request_body(content = CreateOrderRequest, description = "Optional; an empty body is accepted", content_type = "application/json"),
    responses(
        (status = 200, description = "Order created", body = crate::openapi::OrderRecordDoc),
        (status = 400, description = "Request body is not valid JSON", body = String, content_type = "text/plain"),
        (status = 501, description = "No payment provider is configured", body = String, content_type = "text/plain"),
        (status = 502, description = "The provider rejected the order or could not be reached", body = String, content_type = "text/plain"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_order(State(state): State<AppState>, body: Bytes) -> Result<Json<OrderRecord>> {
    let client = state.orders.as_ref().ok_or_else(|| Error::NotConfigured {
        feature: "Payment provider".to_string(),
    })?;

    let request = parse_create_request(&body)?;
    let record = client.create(request).await?;

    Ok(Json(record))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "orders",
    summary = "List orders",
    description = "Snapshot of every stored order, keyed by provider `uuid`. Each value is the latest record seen for that order.",
    responses(
        (status = 200, description = "All orders", body = BTreeMap<String, crate::openapi::OrderRecordDoc>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<BTreeMap<OrderId, OrderRecord>>> {
    let orders = state.store.snapshot().await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/orders/{uuid}",
    tag = "orders",
    summary = "Get order",
    params(
        ("uuid" = String, Path, description = "Provider order uuid"),
    ),
    responses(
        (status = 200, description = "Order found", body = crate::openapi::OrderRecordDoc),
        (status = 404, description = "No order with this uuid", body = String, content_type = "text/plain"),
    )
)]
#[tracing::instrument(skip_all, fields(uuid = %uuid))]
pub async fn get_order(State(state): State<AppState>, Path(uuid): Path<String>) -> Result<Json<OrderRecord>> {
    let record = state.store.get(&uuid).await?.ok_or_else(|| Error::NotFound {
        resource: "Order".to_string(),
        id: uuid.clone(),
    })?;
    Ok(Json(record))
}
