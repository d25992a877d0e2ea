//! Structured logging
//!
//! Standard output carries the request result, so every log line is written
//! to standard error.

use crate::Provider;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize tracing with JSON logs on stderr.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .json();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Span wrapping a single provider call. The API key is never recorded.
pub fn request_span(provider: Provider, model: &str) -> tracing::Span {
    tracing::span!(
        Level::INFO,
        "ai_request",
        provider = %provider,
        model = %model
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing();
        init_tracing();
        let span = request_span(Provider::Gemini, "gemini-2.5-flash-preview-05-20");
        let _guard = span.enter();
        tracing::info!("inside request span");
    }
}
