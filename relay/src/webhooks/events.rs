//! Webhook envelope and event types sent by the provider.

use serde::Deserialize;
use serde_json::Value;

/// Event name for order status transitions.
pub const ORDER_STATUS_CHANGED: &str = "order.status.changed";

/// Webhook event types the relay understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    /// An order moved to a new status; `data` carries the full order record
    OrderStatusChanged,
    /// Anything else. Acknowledged and ignored.
    Unrecognized(String),
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderStatusChanged => write!(f, "{ORDER_STATUS_CHANGED}"),
            Self::Unrecognized(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for WebhookEventType {
    fn from(s: &str) -> Self {
        match s {
            ORDER_STATUS_CHANGED => Self::OrderStatusChanged,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// Notification envelope: `{"event": "...", "data": {...}}`.
///
/// Both fields are optional on the wire. A body without an `event`, or with a non-string one, is
/// acknowledged like any other unrecognized event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub event: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl WebhookEnvelope {
    pub fn event_type(&self) -> WebhookEventType {
        match &self.event {
            Some(Value::String(name)) => WebhookEventType::from(name.as_str()),
            Some(other) => WebhookEventType::Unrecognized(other.to_string()),
            None => WebhookEventType::Unrecognized(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_parsing() {
        assert_eq!(WebhookEventType::from("order.status.changed"), WebhookEventType::OrderStatusChanged);
        assert_eq!(
            WebhookEventType::from("order.created"),
            WebhookEventType::Unrecognized("order.created".to_string())
        );
        assert_eq!(WebhookEventType::OrderStatusChanged.to_string(), "order.status.changed");
    }

    #[test]
    fn test_envelope_deserialize() {
        let envelope: WebhookEnvelope =
            serde_json::from_value(json!({"event": "order.status.changed", "data": {"uuid": "abc"}})).unwrap();
        assert_eq!(envelope.event_type(), WebhookEventType::OrderStatusChanged);
        assert_eq!(envelope.data, Some(json!({"uuid": "abc"})));
    }

    #[test]
    fn test_envelope_without_event() {
        let envelope: WebhookEnvelope = serde_json::from_value(json!({"data": {}})).unwrap();
        assert_eq!(envelope.event_type(), WebhookEventType::Unrecognized(String::new()));
    }

    #[test]
    fn test_envelope_with_non_string_event() {
        let envelope: WebhookEnvelope = serde_json::from_value(json!({"event": 7, "data": {}})).unwrap();
        assert_eq!(envelope.event_type(), WebhookEventType::Unrecognized("7".to_string()));

        let envelope: WebhookEnvelope =
            serde_json::from_value(json!({"event": {"name": "order.status.changed"}})).unwrap();
        assert!(matches!(envelope.event_type(), WebhookEventType::Unrecognized(_)));
    }

    #[test]
    fn test_envelope_must_be_object() {
        assert!(serde_json::from_str::<WebhookEnvelope>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<WebhookEnvelope>("not json").is_err());
    }
}
