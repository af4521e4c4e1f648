//! # order-relay: ArcPay order relay
//!
//! `order-relay` sits between a merchant front end and the ArcPay order API. It creates orders on
//! the merchant's behalf and keeps a local view of their status, updated by signed webhooks from
//! the provider.
//!
//! ## Request Flow
//!
//! #### Order creation (`POST /create`)
//!
//! The body (`{"telegram_id": "..."}`, optional) is combined with the configured order template
//! into an ArcPay order. The order is sent to the provider with the merchant's `ArcKey`; the
//! provider's record is stored under its `uuid` and returned. Provider rejections surface as
//! `502 Bad Gateway` with the provider's status and message.
//!
//! #### Status notifications (`POST /webhook`)
//!
//! The provider signs each notification with the shared webhook secret (hex HMAC-SHA256 of the raw
//! body, sent in `X-Signature`). Verified `order.status.changed` events replace the stored record
//! for `data.uuid`. An order reaching `received` is logged as ready to capture.
//!
//! #### Reads (`GET /`, `GET /orders/{uuid}`)
//!
//! Snapshot of the order store, and single-order lookup.
//!
//! ## Architecture
//!
//! - [`store`]: the [`store::OrderStore`] trait, injected into every handler through [`AppState`]
//! - [`webhooks`]: signature verification and event dispatch
//! - [`orders`]: order payload construction and the creation client
//! - [`payment_providers`]: the provider trait with ArcPay and dummy implementations
//! - [`config`]: YAML plus environment configuration via figment
//!
//! ## Limitations
//!
//! - Orders live in memory and are lost on restart
//! - Webhooks carry no timestamp or nonce, so a captured notification can be replayed
//! - `GET /` is unauthenticated; deploy behind a network boundary

pub mod api;
pub mod config;
pub mod errors;
mod openapi;
pub mod orders;
pub mod payment_providers;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;

use anyhow::Context;
use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    config::CorsOrigin,
    openapi::ApiDoc,
    orders::OrderClient,
    store::{InMemoryOrderStore, OrderStore},
    webhooks::WebhookService,
};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .store(store)
///     .webhooks(webhooks)
///     .maybe_orders(orders)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn OrderStore>,
    pub webhooks: Arc<WebhookService>,
    /// Absent when no provider is configured
    pub orders: Option<Arc<OrderClient>>,
}

/// Build the CORS layer from configuration.
///
/// Only the methods and headers the relay's routes use are allowed. The signature header is
/// included so browser-based webhook tooling can reach `/webhook`.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let allow_origin = if cors_config.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Browsers send the bare origin, without the trailing slash `Url` adds
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let signature_header = HeaderName::from_bytes(config.webhook.signature_header.as_bytes())
        .with_context(|| format!("invalid signature header name: {}", config.webhook.signature_header))?;

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, signature_header])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let enable_metrics = state.config.enable_metrics;
    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/", get(api::handlers::orders::list_orders))
        .route("/create", post(api::handlers::orders::create_order))
        .route("/webhook", post(api::handlers::webhooks::receive_webhook))
        .route("/orders/{uuid}", get(api::handlers::orders::get_order))
        .route("/healthz", get(api::handlers::health::healthz))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state);

    let mut router = router.layer(cors_layer);

    // Add Prometheus metrics if enabled
    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application backed by an in-memory order store.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_store(config, Arc::new(InMemoryOrderStore::new()))
    }

    /// Create a new application with the given order store.
    pub fn with_store(config: Config, store: Arc<dyn OrderStore>) -> anyhow::Result<Self> {
        config.validate()?;

        let secret = config.webhook_secret().context("webhook secret is not configured")?;
        let webhooks = Arc::new(WebhookService::new(secret, store.clone()));

        let orders = match config.provider.clone() {
            Some(provider_config) => {
                let provider = payment_providers::create_provider(provider_config).context("failed to create payment provider")?;
                info!("Order provider: {}", provider.name());
                Some(Arc::new(OrderClient::new(config.order.clone(), provider, store.clone())))
            }
            None => {
                info!("No order provider configured; /create will answer 501");
                None
            }
        };

        let state = AppState::builder()
            .config(config.clone())
            .store(store)
            .webhooks(webhooks)
            .maybe_orders(orders)
            .build();

        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Order relay listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Order relay stopped");
        Ok(())
    }
}
