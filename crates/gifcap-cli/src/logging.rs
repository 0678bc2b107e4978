//! Tracing subscriber setup

use crate::config::{CliConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Filter for the configured verbosity; `RUST_LOG` wins when set
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.verbosity.log_level();
        EnvFilter::new(format!("gifcap={level},gifcap_cli={level}"))
    })
}

/// Install the global subscriber, logging to stderr
///
/// A second call is a no-op.
pub fn init_logging(config: &CliConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match config.log_format {
        LogFormat::Text => builder.with_ansi(config.color.should_color()).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
