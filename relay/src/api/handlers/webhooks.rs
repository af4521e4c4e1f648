//! HTTP handler for provider webhooks.

use axum::{extract::State, http::HeaderMap};
use bytes::Bytes;

use crate::{AppState, errors::Result};

pub const WEBHOOK_ACCEPTED: &str = "Webhook received successfully";

/// Receive an order notification from the provider.
///
/// The raw body is handed to the verifier untouched; re-serializing parsed JSON would change the
/// bytes the signature was computed over.
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "webhooks",
    summary = "Order status webhook",
    description = "Signed notification from the payment provider. The signature header (`X-Signature` unless `webhook.signature_header` configures another name) carries the lowercase hex HMAC-SHA256 of the raw body keyed with the webhook secret. `order.status.changed` events replace the stored order; other events are acknowledged and ignored.",
    request_body(content = crate::openapi::WebhookEnvelopeDoc, content_type = "application/json"),
    params(
        ("X-Signature" = String, Header, description = "Hex HMAC-SHA256 of the raw body. `X-Signature` is the default name; the header actually read is set by `webhook.signature_header`."),
    ),
    responses(
        (status = 200, description = "Notification accepted", body = String, content_type = "text/plain"),
        (status = 400, description = "Signature header missing, or body is not a valid notification", body = String, content_type = "text/plain"),
        (status = 403, description = "Signature does not match the body", body = String, content_type = "text/plain"),
        (status = 500, description = "Unexpected failure", body = String, content_type = "text/plain"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn receive_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<&'static str> {
    // A header that is not valid ASCII can never match a hex digest
    let signature = headers
        .get(state.config.webhook.signature_header.as_str())
        .map(|value| value.to_str().unwrap_or_default());

    state.webhooks.handle(signature, &body).await?;

    Ok(WEBHOOK_ACCEPTED)
}
