//! Structured logging initialisation.
//!
//! Two output formats: human-readable coloured lines for development, and
//! newline-delimited JSON for log aggregation. The filter can be overridden
//! at runtime via `RUST_LOG`; otherwise the caller-supplied level string is
//! used (e.g. `"info"`, `"debug,tally_ledger=trace"`).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the output format for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Pretty-printed output for local development.
    Human,
    /// Newline-delimited JSON for production.
    Json,
}

impl LogFormat {
    /// Parse from a config string; anything other than "json" means human.
    pub fn from_config(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Human
        }
    }
}

/// Initialise the global tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set (i.e. this function
/// was called twice in the same process).
pub fn init_logging(format: LogFormat, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Human => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(true))
                .init();
        }
    }
}
