//! Signed webhook ingestion.
//!
//! ```text
//! WebhookService::handle(signature, body)
//!   ├─ signature absent           → MissingSignature (400)
//!   ├─ HMAC mismatch              → InvalidSignature (403)
//!   ├─ body not a JSON envelope   → MalformedPayload (400)
//!   ├─ order.status.changed
//!   │    ├─ data not an order     → MalformedPayload (400)
//!   │    ├─ store.upsert(data)
//!   │    └─ status == received    → capture intent (log + counter)
//!   └─ any other event            → Ignored (200)
//! ```
//!
//! The store write is the last step, so a rejected notification never touches stored state.

use metrics::counter;
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::store::OrderStore;
use crate::types::{OrderRecord, OrderStatus};
use crate::webhooks::events::{WebhookEnvelope, WebhookEventType};
use crate::webhooks::signing;

/// What happened to an accepted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The order record was written to the store
    Applied { uuid: String, status: Option<OrderStatus> },
    /// The event type is not one we act on
    Ignored { event: WebhookEventType },
}

pub struct WebhookService {
    secret: Vec<u8>,
    store: Arc<dyn OrderStore>,
}

impl WebhookService {
    pub fn new(secret: impl Into<Vec<u8>>, store: Arc<dyn OrderStore>) -> Self {
        Self {
            secret: secret.into(),
            store,
        }
    }

    /// Authenticate a raw notification and apply it to the order store.
    pub async fn handle(&self, signature: Option<&str>, body: &[u8]) -> Result<WebhookOutcome> {
        let outcome = self.process(signature, body).await;

        let label = match &outcome {
            Ok(WebhookOutcome::Applied { .. }) => "applied",
            Ok(WebhookOutcome::Ignored { .. }) => "ignored",
            Err(Error::MissingSignature | Error::InvalidSignature) => "unauthenticated",
            Err(Error::MalformedPayload { .. }) => "malformed",
            Err(_) => "failed",
        };
        counter!("relay_webhooks_total", "outcome" => label).increment(1);

        outcome
    }

    async fn process(&self, signature: Option<&str>, body: &[u8]) -> Result<WebhookOutcome> {
        let signature = signature.ok_or(Error::MissingSignature)?;

        if !signing::verify_signature(body, signature, &self.secret) {
            return Err(Error::InvalidSignature);
        }

        let envelope: WebhookEnvelope = serde_json::from_slice(body).map_err(|e| Error::MalformedPayload { message: e.to_string() })?;

        let event = envelope.event_type();
        tracing::debug!(event = %event, "Webhook received");

        match event {
            WebhookEventType::OrderStatusChanged => {
                let data = envelope.data.ok_or_else(|| Error::MalformedPayload {
                    message: "status change event has no `data`".to_string(),
                })?;
                let record = OrderRecord::try_from(data).map_err(|e| Error::MalformedPayload { message: e.to_string() })?;

                let uuid = record.uuid().to_string();
                let status = record.status();

                self.store.upsert(record).await?;
                tracing::info!(order_id = %uuid, status = ?status.as_ref().map(OrderStatus::as_str), "Order status updated");

                if status == Some(OrderStatus::Received) {
                    signal_capture_intent(&uuid);
                }

                Ok(WebhookOutcome::Applied { uuid, status })
            }
            WebhookEventType::Unrecognized(_) => {
                tracing::debug!(event = %event, "Ignoring webhook event type");
                Ok(WebhookOutcome::Ignored { event })
            }
        }
    }
}

/// Hook for orders that reached `received`.
///
/// Only signals intent; no capture call is made against the provider.
fn signal_capture_intent(uuid: &str) {
    tracing::info!(order_id = %uuid, "Order received successfully, ready to capture");
    counter!("relay_orders_capture_intent_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryOrderStore;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use serde_json::json;

    const SECRET: &str = "s3cr3t";

    fn service() -> (WebhookService, InMemoryOrderStore) {
        let store = InMemoryOrderStore::new();
        (WebhookService::new(SECRET, Arc::new(store.clone())), store)
    }

    fn sign(body: &[u8]) -> String {
        signing::sign_payload(body, SECRET.as_bytes())
    }

    #[tokio::test]
    async fn test_received_order_is_stored() {
        let (service, store) = service();
        let body = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"received"}}"#;

        let outcome = service.handle(Some(&sign(body)), body).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Applied {
                uuid: "abc".to_string(),
                status: Some(OrderStatus::Received)
            }
        );
        let stored = store.get("abc").await.unwrap().unwrap();
        assert_eq!(stored.status_str(), Some("received"));
    }

    /// Run `future` with a thread-local recorder and return how many capture intents it signalled.
    fn count_capture_intents<F: std::future::Future>(future: F) -> (F::Output, u64) {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let output = metrics::with_local_recorder(&recorder, || runtime.block_on(future));

        let count = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find_map(|(key, _, _, value)| match value {
                DebugValue::Counter(n) if key.key().name() == "relay_orders_capture_intent_total" => Some(n),
                _ => None,
            })
            .unwrap_or(0);
        (output, count)
    }

    #[test]
    fn test_received_status_signals_capture_intent_once() {
        let (service, _store) = service();
        let body = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"received"}}"#;

        let (outcome, intents) = count_capture_intents(service.handle(Some(&sign(body)), body));

        assert!(outcome.is_ok());
        assert_eq!(intents, 1);
    }

    #[test]
    fn test_other_statuses_do_not_signal_capture_intent() {
        let (service, store) = service();
        let bodies: [&[u8]; 3] = [
            br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"pending"}}"#,
            br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"captured"}}"#,
            br#"{"event":"order.received","data":{"uuid":"abc","status":"received"}}"#,
        ];

        let (results, intents) = count_capture_intents(async {
            let mut results = Vec::new();
            for body in bodies {
                results.push(service.handle(Some(&sign(body)), body).await);
            }
            results
        });

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(intents, 0);
        // The ignored event must not have overwritten the captured record
        let (stored, _) = count_capture_intents(store.get("abc"));
        assert_eq!(stored.unwrap().unwrap().status_str(), Some("captured"));
    }

    #[test]
    fn test_rejected_notification_does_not_signal_capture_intent() {
        let (service, _store) = service();
        let body = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"received"}}"#;
        let forged = signing::sign_payload(body, b"not-the-secret");

        let (outcome, intents) = count_capture_intents(service.handle(Some(&forged), body));

        assert!(matches!(outcome, Err(Error::InvalidSignature)));
        assert_eq!(intents, 0);
    }

    #[tokio::test]
    async fn test_non_string_event_is_ignored() {
        let (service, store) = service();
        let body = br#"{"event":7,"data":{"uuid":"abc","status":"received"}}"#;

        let outcome = service.handle(Some(&sign(body)), body).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                event: WebhookEventType::Unrecognized("7".to_string())
            }
        );
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stored_record_equals_event_data() {
        let (service, store) = service();
        let data = json!({"uuid": "u-1", "status": "pending", "amount": 0.8, "testnet": true});
        let body = serde_json::to_vec(&json!({"event": "order.status.changed", "data": data})).unwrap();

        service.handle(Some(&sign(&body)), &body).await.unwrap();

        let stored = store.get("u-1").await.unwrap().unwrap();
        assert_eq!(stored.into_value(), data);
    }

    #[tokio::test]
    async fn test_missing_signature() {
        let (service, store) = service();
        let body = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"received"}}"#;

        let err = service.handle(None, body).await.unwrap_err();

        assert!(matches!(err, Error::MissingSignature));
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_signature() {
        let (service, store) = service();
        let body = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"received"}}"#;
        let wrong = signing::sign_payload(body, b"not-the-secret");

        let err = service.handle(Some(&wrong), body).await.unwrap_err();

        assert!(matches!(err, Error::InvalidSignature));
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_signature_checked_before_parsing() {
        let (service, _store) = service();

        // Garbage body with a bad signature is an auth failure, not a parse failure
        let err = service.handle(Some("deadbeef"), b"{not json").await.unwrap_err();
        assert!(matches!(err, Error::InvalidSignature));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (service, store) = service();
        let body = b"{not json";

        let err = service.handle(Some(&sign(body)), body).await.unwrap_err();

        assert!(matches!(err, Error::MalformedPayload { .. }));
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_status_change_without_uuid_is_rejected() {
        let (service, store) = service();
        let body = br#"{"event":"order.status.changed","data":{"status":"received"}}"#;

        let err = service.handle(Some(&sign(body)), body).await.unwrap_err();

        assert!(matches!(err, Error::MalformedPayload { .. }));
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_status_change_without_data_is_rejected() {
        let (service, _store) = service();
        let body = br#"{"event":"order.status.changed"}"#;

        let err = service.handle(Some(&sign(body)), body).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));
    }

    #[tokio::test]
    async fn test_unrecognized_event_is_ignored() {
        let (service, store) = service();
        store
            .upsert(OrderRecord::try_from(json!({"uuid": "abc", "status": "created"})).unwrap())
            .await
            .unwrap();
        let before = store.snapshot().await.unwrap();

        let body = br#"{"event":"order.refunded","data":{"uuid":"abc","status":"refunded"}}"#;
        let outcome = service.handle(Some(&sign(body)), body).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                event: WebhookEventType::Unrecognized("order.refunded".to_string())
            }
        );
        assert_eq!(store.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_sequential_events_last_write_wins() {
        let (service, store) = service();

        let first = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"pending"}}"#;
        let second = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"received","txn":{"hash":"h"}}}"#;

        service.handle(Some(&sign(first)), first).await.unwrap();
        service.handle(Some(&sign(second)), second).await.unwrap();

        let stored = store.get("abc").await.unwrap().unwrap();
        assert_eq!(
            stored.into_value(),
            json!({"uuid": "abc", "status": "received", "txn": {"hash": "h"}})
        );
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replayed_notification_is_accepted() {
        // No nonce or timestamp in the signed content: replays verify again
        let (service, store) = service();
        let body = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"received"}}"#;
        let signature = sign(body);

        service.handle(Some(&signature), body).await.unwrap();
        service.handle(Some(&signature), body).await.unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
    }
}
