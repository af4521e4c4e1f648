//! Test helpers shared across handler tests.

use axum_test::TestServer;
use std::sync::Arc;

use crate::config::{DummyConfig, ProviderConfig};
use crate::store::InMemoryOrderStore;
use crate::{Application, Config};

pub const TEST_WEBHOOK_SECRET: &str = "s3cr3t";

/// Install the process-wide rustls provider. Safe to call from every test.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Default configuration with a known webhook secret and the dummy provider.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.webhook.secret = Some(TEST_WEBHOOK_SECRET.to_string());
    config.provider = Some(ProviderConfig::Dummy(DummyConfig {
        status: "created".to_string(),
    }));
    config
}

/// Build a test server over a fresh in-memory store. The store handle is shared with the app.
pub fn create_test_app(config: Config) -> (TestServer, InMemoryOrderStore) {
    install_crypto_provider();
    let store = InMemoryOrderStore::new();
    let app = Application::with_store(config, Arc::new(store.clone())).expect("Failed to create application");
    (app.into_test_server(), store)
}
