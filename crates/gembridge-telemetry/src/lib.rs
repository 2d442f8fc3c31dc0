//! Logging setup for the gembridge binary
//!
//! Library crates only emit `tracing` events; installing a subscriber is left
//! to the binary through [`init`].

use anyhow::Context;
use gembridge_config::TelemetryConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber
///
/// Logs go to stderr so stdout carries only model output. `RUST_LOG`, when
/// set, takes precedence over the configured filter.
///
/// # Errors
///
/// Returns an error if the filter directives are invalid or a global
/// subscriber is already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = build_filter(&config.log_filter)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt_layer.json()).try_init()
    } else {
        registry.with(fmt_layer).try_init()
    };

    installed.context("failed to install tracing subscriber")
}

fn build_filter(configured: &str) -> anyhow::Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(&directives).with_context(|| format!("invalid RUST_LOG filter `{directives}`"))
        }
        _ => EnvFilter::try_new(configured).with_context(|| format!("invalid telemetry.log_filter `{configured}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_used_without_rust_log() {
        temp_env::with_var_unset("RUST_LOG", || {
            let filter = build_filter("warn,gembridge_llm=debug").unwrap().to_string();
            assert!(filter.contains("gembridge_llm=debug"));
            assert!(filter.contains("warn"));
        });
    }

    #[test]
    fn rust_log_overrides_configured_filter() {
        temp_env::with_var("RUST_LOG", Some("trace"), || {
            let filter = build_filter("info").unwrap().to_string();
            assert!(filter.contains("trace"));
            assert!(!filter.contains("info"));
        });
    }

    #[test]
    fn invalid_filter_is_an_error() {
        temp_env::with_var_unset("RUST_LOG", || {
            let err = build_filter("gembridge_llm=loud").unwrap_err();
            assert!(err.to_string().contains("telemetry.log_filter"));
        });
    }
}
