//! Configuration for the Gemini client and its binary
//!
//! Loaded from TOML with `{{ env.VAR }}` placeholders expanded first, so
//! secrets can stay in the environment.

#![allow(clippy::must_use_candidate)]

mod env;
pub mod gemini;
mod loader;
pub mod telemetry;

use serde::Deserialize;

pub use gemini::{GeminiConfig, PricingConfig, ThinkingConfig};
pub use telemetry::TelemetryConfig;

/// Top-level configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Gemini client settings
    pub gemini: GeminiConfig,
    /// Logging settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
