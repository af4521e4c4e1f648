//! Inbound webhook notifications from the payment provider.
//!
//! - [`signing`]: HMAC-SHA256 hex signatures over the raw body
//! - [`events`]: Envelope and event types
//! - [`service`]: Verify, parse and apply notifications to the order store

pub mod events;
pub mod service;
pub mod signing;

pub use events::{WebhookEnvelope, WebhookEventType};
pub use service::{WebhookOutcome, WebhookService};
pub use signing::{sign_payload, verify_signature};
