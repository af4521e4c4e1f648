//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `RELAY_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Legacy variables** - `PORT`, `PRIVATE_KEY` (webhook secret) and `ARC_KEY` (provider API key)
//! 3. **Environment variables** - Variables prefixed with `RELAY_` override everything above
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `RELAY_PROVIDER__ARCPAY__API_KEY=...` sets `provider.arcpay.api_key`.
//!
//! ## Example
//!
//! ```yaml
//! port: 1080
//! webhook:
//!   secret: "shared-secret-from-provider-dashboard"
//! provider:
//!   arcpay:
//!     api_key: "merchant-api-key"
//!     timeout: 10s
//! cors:
//!   allowed_origins:
//!     - https://shop.example.com
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "RELAY_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config validation: {0}")]
    Invalid(String),
}

/// Main application configuration.
///
/// All fields have defaults; only the webhook secret is mandatory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Log output format
    pub log_format: LogFormat,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Inbound webhook verification
    pub webhook: WebhookConfig,
    /// Payment provider used to create orders. `/create` answers 501 when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,
    /// Shape of the orders sent to the provider
    pub order: OrderConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Webhook verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    /// Shared HMAC secret. Set via `PRIVATE_KEY` or `RELAY_WEBHOOK__SECRET`.
    #[serde(skip_serializing, deserialize_with = "optional_string_like")]
    pub secret: Option<String>,
    /// Header carrying the hex signature
    pub signature_header: String,
}

/// Payment provider configuration.
///
/// Credentials should be set via environment variables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderConfig {
    /// ArcPay order API
    /// Set credentials via:
    /// - `ARC_KEY` or `RELAY_PROVIDER__ARCPAY__API_KEY` - merchant API key
    ArcPay(ArcPayConfig),
    /// In-process provider that fabricates orders, for development
    Dummy(DummyConfig),
}

/// ArcPay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArcPayConfig {
    /// Merchant API key, sent in the `ArcKey` header
    #[serde(skip_serializing, deserialize_with = "string_like")]
    pub api_key: String,
    /// API root; orders are created at `{base_url}/order`
    #[serde(default = "ArcPayConfig::default_base_url")]
    pub base_url: Url,
    /// Request timeout for calls to the provider
    #[serde(default = "ArcPayConfig::default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl ArcPayConfig {
    fn default_base_url() -> Url {
        Url::parse("https://arcpay.online/api/v1/arcpay").expect("static URL is valid")
    }

    fn default_timeout() -> Duration {
        Duration::from_secs(30)
    }
}

/// Dummy provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DummyConfig {
    /// Status reported for fabricated orders
    #[serde(default = "DummyConfig::default_status")]
    pub status: String,
}

impl DummyConfig {
    fn default_status() -> String {
        "created".to_string()
    }
}

/// Order template used by `/create`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderConfig {
    pub title: String,
    pub currency: String,
    /// Prefix of the generated merchant order id, followed by a UTC timestamp
    pub id_prefix: String,
    pub items: Vec<LineItemConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LineItemConfig {
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Unit price in `order.currency`
    pub price: f64,
    pub count: u32,
    pub item_id: String,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard", serialize_with = "serialize_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://shop.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn serialize_wildcard<S>(serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("*")
}

/// Secret from a legacy variable, kept as the raw string.
///
/// Going through `Env` would parse `PRIVATE_KEY=0123` as the number 123.
fn legacy_secret(var: &str, key: &str) -> Figment {
    Env::raw()
        .only(&[var])
        .iter()
        .fold(Figment::new(), |figment, (_, value)| figment.merge((key, value)))
}

/// Scalars as figment may type them; `RELAY_WEBHOOK__SECRET=123456` arrives as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringLike {
    String(String),
    Char(char),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl From<StringLike> for String {
    fn from(value: StringLike) -> Self {
        match value {
            StringLike::String(s) => s,
            StringLike::Char(c) => c.to_string(),
            StringLike::Unsigned(n) => n.to_string(),
            StringLike::Signed(n) => n.to_string(),
            StringLike::Float(n) => n.to_string(),
            StringLike::Bool(b) => b.to_string(),
        }
    }
}

fn string_like<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    StringLike::deserialize(deserializer).map(String::from)
}

fn optional_string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<StringLike>::deserialize(deserializer).map(|value| value.map(String::from))
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1080,
            log_format: LogFormat::default(),
            enable_metrics: false,
            webhook: WebhookConfig::default(),
            provider: None,
            order: OrderConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            signature_header: "X-Signature".to_string(),
        }
    }
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            title: "Premium Subscription Box".to_string(),
            currency: "TON".to_string(),
            id_prefix: "INV-".to_string(),
            items: vec![
                LineItemConfig {
                    title: "Exclusive Travel Package".to_string(),
                    description: "A luxurious 5-day trip to Bali with first-class accommodation.".to_string(),
                    image_url: "https://www.luxurytravelmagazine.com/files/610/1/2901/Kayon-Jungle-aerial_reg.jpg".to_string(),
                    price: 0.5,
                    count: 1,
                    item_id: "id-987654".to_string(),
                },
                LineItemConfig {
                    title: "Gourmet Dinner Experience".to_string(),
                    description: "A 7-course gourmet dinner at a Michelin-starred restaurant.".to_string(),
                    image_url: "https://www.luxurytravelmagazine.com/files/610/2/2572/Samabe-restaurant_big_reg.jpg".to_string(),
                    price: 0.15,
                    count: 2,
                    item_id: "id-654321".to_string(),
                },
            ],
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                CorsOrigin::Url(Url::parse("http://localhost:5173").expect("static URL is valid")), // Development frontend (Vite)
            ],
            allow_credentials: true,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.webhook.secret.as_deref() {
            None | Some("") => {
                return Err(ConfigError::Invalid(
                    "webhook secret is not configured. Set PRIVATE_KEY or RELAY_WEBHOOK__SECRET.".to_string(),
                ));
            }
            Some(_) => {}
        }

        if axum::http::HeaderName::from_bytes(self.webhook.signature_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid(format!(
                "webhook.signature_header '{}' is not a valid header name",
                self.webhook.signature_header
            )));
        }

        if let Some(ProviderConfig::ArcPay(arcpay)) = &self.provider {
            if arcpay.api_key.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "provider.arcpay.api_key is empty. Set ARC_KEY or RELAY_PROVIDER__ARCPAY__API_KEY.".to_string(),
                ));
            }
            if !matches!(arcpay.base_url.scheme(), "https" | "http") {
                return Err(ConfigError::Invalid(format!(
                    "provider.arcpay.base_url must be an http(s) URL, got '{}'",
                    arcpay.base_url
                )));
            }
            if arcpay.timeout.is_zero() {
                return Err(ConfigError::Invalid("provider.arcpay.timeout must be positive".to_string()));
            }
        }

        if self.order.items.is_empty() {
            return Err(ConfigError::Invalid("order.items must contain at least one item".to_string()));
        }

        if self.cors.allow_credentials && self.cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
            return Err(ConfigError::Invalid(
                "cors.allowed_origins cannot contain '*' while cors.allow_credentials is enabled".to_string(),
            ));
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Variable names used by existing deployments of the relay
            .merge(Env::raw().only(&["PORT"]))
            .merge(legacy_secret("PRIVATE_KEY", "webhook.secret"))
            .merge(legacy_secret("ARC_KEY", "provider.arcpay.api_key"))
            // Prefixed variables win over everything else
            .merge(Env::prefixed("RELAY_").ignore(&["CONFIG"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The webhook secret. Present once [`Config::validate`] has passed.
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook.secret.as_deref().filter(|s| !s.is_empty())
    }
}
