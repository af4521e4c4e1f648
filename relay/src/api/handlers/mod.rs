//! HTTP request handlers.
//!
//! Handlers return [`crate::errors::Error`], which converts to the matching status code and a
//! plain-text body.
//!
//! - [`health`]: liveness probe
//! - [`orders`]: order creation and order store reads
//! - [`webhooks`]: provider status notifications

pub mod health;
pub mod orders;
pub mod webhooks;
