//! Tracing subscriber setup for the CLI.

use crate::config::{LogFormat, LoggingConfig};
use tracing::Level;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const FALLBACK_LEVEL: &str = "info";

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
///
/// `RUST_LOG` takes precedence over `config.level`; `verbose` raises the floor to DEBUG.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<(), TryInitError> {
    let filter = build_filter(
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        &config.level,
        verbose,
    );
    let layer = match config.format {
        LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
}

/// Filter from `env_directives` if set and valid, else `level`, else `info`.
pub fn build_filter(env_directives: Option<&str>, level: &str, verbose: bool) -> EnvFilter {
    let filter = env_directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_LEVEL));
    if verbose {
        filter.add_directive(Level::DEBUG.into())
    } else {
        filter
    }
}
