//! Order creation against the configured provider.

mod client;
mod payload;

pub use client::OrderClient;
pub use payload::{CreateOrderRequest, LineItem, OrderMeta, OrderPayload, merchant_order_id};
