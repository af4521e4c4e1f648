//! Tracing subscriber initialization.
//!
//! Log verbosity follows `RUST_LOG` (default `info`), e.g.:
//!
//! ```bash
//! export RUST_LOG="order_relay=debug,tower_http=info"
//! ```
//!
//! Output is human-readable by default. Set `log_format: json` in config.yaml for one JSON object
//! per line.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogFormat;

/// Initialize tracing with console output in the requested format.
pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .try_init()?;
        }
    }

    info!(format = ?format, "Telemetry initialized");
    Ok(())
}
