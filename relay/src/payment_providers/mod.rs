//! Order provider abstraction layer
//!
//! This module defines the `OrderProvider` trait which abstracts order creation across payment
//! providers. ArcPay is the production provider; the dummy provider fabricates orders in process.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{config::ProviderConfig, orders::OrderPayload, types::OrderRecord};

pub mod arcpay;
pub mod dummy;

/// Create an order provider from configuration
///
/// This is the single point where we convert config into provider instances.
/// Adding a new provider requires adding a match arm here.
pub fn create_provider(config: ProviderConfig) -> Result<Arc<dyn OrderProvider>> {
    let provider: Arc<dyn OrderProvider> = match config {
        ProviderConfig::ArcPay(arcpay_config) => Arc::new(arcpay::ArcPayProvider::new(arcpay_config)?),
        ProviderConfig::Dummy(dummy_config) => Arc::new(dummy::DummyProvider::from(dummy_config)),
    };
    Ok(provider)
}

/// Result type for order provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while talking to a provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status
    #[error("Provider rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, timeout, connection reset)
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body is not an order record
    #[error("Provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Abstract order provider interface
#[async_trait]
pub trait OrderProvider: Send + Sync {
    /// Create an order with the provider
    ///
    /// Returns the provider's order record, which carries the `uuid` later used by status
    /// notifications.
    async fn create_order(&self, order: &OrderPayload) -> Result<OrderRecord>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}
