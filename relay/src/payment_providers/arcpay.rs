//! ArcPay order API client.

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{
    config::ArcPayConfig,
    orders::OrderPayload,
    payment_providers::{OrderProvider, ProviderError, Result},
    types::OrderRecord,
};

/// Header carrying the merchant API key.
pub const API_KEY_HEADER: &str = "ArcKey";

/// Upper bound on provider error text echoed back to callers
const MAX_ERROR_MESSAGE_LEN: usize = 512;

pub struct ArcPayProvider {
    client: Client,
    api_key: String,
    orders_url: String,
}

impl ArcPayProvider {
    pub fn new(config: ArcPayConfig) -> Result<Self> {
        // Certificate verification stays on: the ArcKey header must only reach the real provider
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key,
            orders_url: format!("{}/order", config.base_url.as_str().trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl OrderProvider for ArcPayProvider {
    #[tracing::instrument(skip_all, fields(order_id = %order.order_id))]
    async fn create_order(&self, order: &OrderPayload) -> Result<OrderRecord> {
        let response = self
            .client
            .post(&self.orders_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(order)
            .send()
            .await
            .inspect_err(|e| {
                tracing::warn!("ArcPay request failed: {}", e);
                counter!("relay_provider_errors_total", "kind" => "transport").increment(1);
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            tracing::warn!(status = status.as_u16(), "ArcPay rejected order: {}", message);
            counter!("relay_provider_errors_total", "kind" => "rejected").increment(1);
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let record = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
            .and_then(|value| OrderRecord::try_from(value).map_err(|e| ProviderError::InvalidResponse(e.to_string())))
            .inspect_err(|_| {
                counter!("relay_provider_errors_total", "kind" => "invalid_response").increment(1);
            })?;

        tracing::debug!(uuid = %record.uuid(), "ArcPay order created");
        Ok(record)
    }

    fn name(&self) -> &'static str {
        "arcpay"
    }
}

/// Pick a human-readable message out of an error response.
///
/// ArcPay error bodies are JSON with a `message` field; anything else is passed through as text.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        return status.canonical_reason().unwrap_or("Unknown error").to_string();
    }

    match message.char_indices().nth(MAX_ERROR_MESSAGE_LEN) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message,
    }
}
