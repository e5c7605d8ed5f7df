//! Process-wide tracing setup, mirroring the teacher's use of
//! `tracing-subscriber` with `env-filter` + `json` features. Call once at
//! process start; safe to call more than once in tests (`try_init`).

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for local development.
    Pretty,
    /// Structured JSON, for production log aggregation.
    Json,
}

/// Initialize the global tracing subscriber. `RUST_LOG` controls the
/// filter (defaults to `info`) per `EnvFilter::from_default_env`.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
    };

    if let Err(err) = result {
        eprintln!("tracing subscriber already initialized: {err}");
    }
}
