//! Gemini `streamGenerateContent` transport

use std::sync::Arc;

use async_trait::async_trait;
use gembridge_config::GeminiConfig;
use http::StatusCode;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{ChatStream, Provider};
use crate::convert::build_request;
use crate::error::LlmError;
use crate::pricing::{CostEstimator, FlatRate, NoPricing};
use crate::protocol::google::GoogleErrorResponse;
use crate::stream::{ErrorReporter, EventStream, ResponseTranslator, TracingReporter};
use crate::types::{ChatRequest, ReasoningConfig};

/// Default Google Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header naming the project billed for bearer-token calls
const USER_PROJECT_HEADER: &str = "x-goog-user-project";

/// How requests are authenticated
pub enum Credential {
    /// API key sent as the `key` query parameter
    ApiKey(SecretString),
    /// OAuth access token sent as a bearer token
    AccessToken {
        /// The token
        token: SecretString,
        /// Project billed for the call
        project_id: Option<String>,
    },
}

impl Credential {
    /// Pick the strategy for a configuration, preferring the API key
    pub fn from_config(config: &GeminiConfig) -> Result<Self, LlmError> {
        if let Some(key) = config.api_key() {
            return Ok(Self::ApiKey(key.clone()));
        }
        if let Some(token) = config.access_token() {
            return Ok(Self::AccessToken {
                token: token.clone(),
                project_id: config.project_id.clone(),
            });
        }
        Err(LlmError::MissingCredentials)
    }

    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::ApiKey(key) => builder.query(&[("key", key.expose_secret())]),
            Self::AccessToken { token, project_id } => {
                let builder = builder.bearer_auth(token.expose_secret());
                match project_id {
                    Some(project) => builder.header(USER_PROJECT_HEADER, project),
                    None => builder,
                }
            }
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey([REDACTED])"),
            Self::AccessToken { project_id, .. } => f
                .debug_struct("AccessToken")
                .field("token", &"[REDACTED]")
                .field("project_id", project_id)
                .finish(),
        }
    }
}

/// Values from configuration used where a request leaves them unset
#[derive(Debug, Clone, Default)]
struct RequestDefaults {
    model: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    reasoning: Option<ReasoningConfig>,
}

/// Streaming client for the Gemini API
pub struct GeminiProvider {
    client: Client,
    base_url: Url,
    credential: Credential,
    defaults: RequestDefaults,
    cost: Arc<dyn CostEstimator>,
    reporter: Arc<dyn ErrorReporter>,
}

impl GeminiProvider {
    /// Create from configuration
    ///
    /// Usage is priced from `pricing` when present. Decode errors are logged
    /// until [`with_reporter`](Self::with_reporter) says otherwise.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingCredentials` if neither an API key nor an
    /// access token is configured.
    pub fn new(config: &GeminiConfig) -> Result<Self, LlmError> {
        let credential = Credential::from_config(config)?;

        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| LlmError::InvalidRequest(e.to_string()))?,
        };

        let cost: Arc<dyn CostEstimator> = match config.pricing {
            Some(pricing) => Arc::new(FlatRate::new(pricing.input_per_mtok, pricing.output_per_mtok)),
            None => Arc::new(NoPricing),
        };

        let reasoning = config.thinking.as_ref().map(|thinking| ReasoningConfig {
            budget_tokens: thinking.budget,
            include_thoughts: thinking.include_thoughts,
        });

        Ok(Self {
            client: Client::new(),
            base_url,
            credential,
            defaults: RequestDefaults {
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_output_tokens,
                reasoning,
            },
            cost,
            reporter: Arc::new(TracingReporter),
        })
    }

    /// Send decode errors to `reporter` instead of the log
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Price usage events with `cost`
    #[must_use]
    pub fn with_cost_estimator(mut self, cost: Arc<dyn CostEstimator>) -> Self {
        self.cost = cost;
        self
    }

    /// Credential strategy in use
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Build the `streamGenerateContent` endpoint URL for a model
    ///
    /// `model` is the name as sent upstream, already stripped of `:thinking`.
    pub fn stream_url(&self, model: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/models/{model}:streamGenerateContent")
    }

    /// Fill unset request fields from configuration
    fn with_defaults(&self, request: &ChatRequest) -> ChatRequest {
        let mut request = request.clone();
        if request.model.is_empty() {
            request.model.clone_from(&self.defaults.model);
        }
        request.params.temperature = request.params.temperature.or(self.defaults.temperature);
        request.params.max_tokens = request.params.max_tokens.or(self.defaults.max_tokens);
        if request.reasoning.is_none() {
            request.reasoning.clone_from(&self.defaults.reasoning);
        }
        request
    }

    /// Build the HTTP request without sending it
    fn prepare(&self, request: &ChatRequest) -> Result<RequestBuilder, LlmError> {
        let body = build_request(request)?;
        let builder = self.client.post(self.stream_url(request.model_name())).json(&body);
        Ok(self.credential.apply(builder))
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatStream, LlmError> {
        let request = self.with_defaults(request);
        let builder = self.prepare(&request)?;

        tracing::debug!(
            model = %request.model_name(),
            messages = request.messages.len(),
            reasoning = request.effective_reasoning().is_some(),
            "sending streaming request"
        );

        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, "upstream request failed");
            LlmError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::warn!(status = %status, error = %e, "failed to read upstream error body");
                String::new()
            });
            match serde_json::from_str::<GoogleErrorResponse>(&body) {
                Ok(parsed) => tracing::warn!(
                    status = %status,
                    reason = %parsed.error.status,
                    message = %parsed.error.message,
                    "upstream returned error"
                ),
                Err(_) => tracing::warn!(status = %status, "upstream returned error"),
            }
            return Err(LlmError::Upstream { status, body });
        }

        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            tracing::warn!(status = %status, "upstream returned no body");
            return Err(LlmError::MissingBody);
        }

        let translator = ResponseTranslator::new(request.model_name(), Arc::clone(&self.cost));
        let events = EventStream::new(
            Box::pin(response.bytes_stream()),
            translator,
            Arc::clone(&self.reporter),
        );
        let metadata = events.metadata();

        Ok(ChatStream::new(Box::pin(events), metadata))
    }
}
