use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

/// Gemini client settings
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key, sent as the `key` query parameter
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// OAuth access token, used when no API key is set
    #[serde(default)]
    pub access_token: Option<SecretString>,
    /// Project billed for bearer-token calls (`x-goog-user-project`)
    #[serde(default)]
    pub project_id: Option<String>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Default model id, optionally ending in `:thinking`
    #[serde(default = "default_model")]
    pub model: String,
    /// Default sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Default output token limit
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    /// Reasoning defaults
    #[serde(default)]
    pub thinking: Option<ThinkingConfig>,
    /// Rates used to price usage events
    #[serde(default)]
    pub pricing: Option<PricingConfig>,
}

impl GeminiConfig {
    /// API key, if set and not empty
    pub fn api_key(&self) -> Option<&SecretString> {
        non_empty(self.api_key.as_ref())
    }

    /// Access token, if set and not empty
    pub fn access_token(&self) -> Option<&SecretString> {
        non_empty(self.access_token.as_ref())
    }
}

// `default("")` placeholders leave empty secrets behind
fn non_empty(secret: Option<&SecretString>) -> Option<&SecretString> {
    secret.filter(|s| !s.expose_secret().is_empty())
}

fn default_model() -> String {
    "gemini-2.5-flash".to_owned()
}

/// Reasoning defaults applied when a request sets none
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThinkingConfig {
    /// Token budget; `-1` lets the model decide
    #[serde(default)]
    pub budget: Option<i32>,
    /// Stream thought summaries back
    #[serde(default = "default_true")]
    pub include_thoughts: bool,
}

const fn default_true() -> bool {
    true
}

/// Flat per-million-token prices
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// USD per million input tokens
    pub input_per_mtok: f64,
    /// USD per million output tokens
    pub output_per_mtok: f64,
}
