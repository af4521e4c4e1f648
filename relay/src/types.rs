//! Order record and status types.
//!
//! The relay does not own the provider's order schema. An [`OrderRecord`] is kept as the raw JSON
//! object the provider sent us; the only fields the relay reads are:
//!
//! - `uuid`: the provider-assigned order identifier, used as the store key
//! - `status`: the order's lifecycle state, see [`OrderStatus`]
//!
//! A record can only be constructed from a JSON object carrying a string `uuid`, so anything that
//! reaches the store is guaranteed to have a key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Provider-assigned order identifier.
pub type OrderId = String;

/// Errors raised when a JSON value cannot be used as an order record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("order record must be a JSON object")]
    NotAnObject,

    #[error("order record is missing a string `uuid` field")]
    MissingUuid,
}

/// An order as reported by the payment provider.
///
/// Serializes back to exactly the object it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct OrderRecord {
    fields: Map<String, Value>,
}

impl OrderRecord {
    /// The provider-assigned identifier. Always present.
    pub fn uuid(&self) -> &str {
        // Checked at construction
        self.fields.get("uuid").and_then(Value::as_str).unwrap_or_default()
    }

    /// Raw status string, if the provider sent one.
    pub fn status_str(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<OrderStatus> {
        self.status_str().map(OrderStatus::from)
    }

    /// Look up any other field of the provider's payload.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for OrderRecord {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err(RecordError::NotAnObject);
        };

        match fields.get("uuid") {
            Some(Value::String(uuid)) if !uuid.is_empty() => Ok(Self { fields }),
            _ => Err(RecordError::MissingUuid),
        }
    }
}

impl From<OrderRecord> for Value {
    fn from(record: OrderRecord) -> Self {
        record.into_value()
    }
}

/// Order lifecycle states known to the provider.
///
/// Unknown states are preserved in [`OrderStatus::Other`] rather than rejected, since the
/// provider owns the schema and may add states at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    /// Created but not processed yet
    Created,
    /// Waiting for further action
    Pending,
    /// Being processed
    Processing,
    /// Payment received, ready to capture
    Received,
    /// Payment finalized
    Captured,
    Failed,
    Canceled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Received => "received",
            Self::Captured => "captured",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "received" => Self::Received,
            "captured" => Self::Captured,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
