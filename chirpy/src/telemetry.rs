//! Tracing subscriber initialization.
//!
//! Log verbosity follows `RUST_LOG` (default `info`). The output format is chosen by
//! `log_format` in the configuration: human-readable `pretty` lines, or one JSON object per
//! event for log shippers.
//!
//! ```bash
//! RUST_LOG=chirpy=debug,tower_http=info chirpy -f config.yaml
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogFormat;

/// Initialize the global tracing subscriber
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

    info!("Telemetry initialized ({:?} log format)", format);
    Ok(())
}
