use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

/// Installs the global subscriber. `RUST_LOG` takes precedence over the configured level.
///
/// Logs go to stderr, stdout is reserved for the batch responses.
pub fn init_logging(config: &Config) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

  let registry = tracing_subscriber::registry().with(filter);

  if config.log_json {
    let layer = fmt::layer()
      .json()
      .with_current_span(true)
      .with_writer(std::io::stderr);
    registry.with(layer).init();
  } else {
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    registry.with(layer).init();
  }
}
