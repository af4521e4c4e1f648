//! API layer for HTTP request handling.
//!
//! # API Structure
//!
//! - **Orders** (`POST /create`, `GET /`, `GET /orders/{uuid}`): order creation and lookup
//! - **Webhooks** (`POST /webhook`): signed order status notifications from the provider
//! - **Health** (`GET /healthz`): liveness
//!
//! # OpenAPI Documentation
//!
//! Endpoints are documented with `utoipa` annotations. The document is served at
//! `/api-docs/openapi.json` and rendered at `/docs`.

pub mod handlers;
