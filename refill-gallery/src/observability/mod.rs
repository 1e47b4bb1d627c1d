//! Logging setup
//!
//! Structured logging through `tracing`, with pretty output for development
//! builds and JSON lines for release builds. `RUST_LOG` overrides the
//! default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human readable output
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Pretty in debug builds, JSON otherwise
    #[must_use]
    pub const fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub const fn default_directives(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Pretty => "debug,refill_gallery=trace,tower_http=debug",
        LogFormat::Json => "info,tower_http=info",
    }
}

/// Initialize logging with the format matching the build profile
///
/// # Example
///
/// ```rust,no_run
/// use refill_gallery::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    init_with(LogFormat::for_build())
}

/// Initialize logging with an explicit format
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_with(format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(format)));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for format in [LogFormat::Pretty, LogFormat::Json] {
            assert!(EnvFilter::try_new(default_directives(format)).is_ok());
        }
    }

    #[test]
    fn test_build_format() {
        let expected = if cfg!(debug_assertions) {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        };
        assert_eq!(LogFormat::for_build(), expected);
    }
}
