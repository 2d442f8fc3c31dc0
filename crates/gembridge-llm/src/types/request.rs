use serde::{Deserialize, Serialize};

use super::message::Message;
use super::tool::{ToolChoice, ToolDefinition};

/// Suffix marking a model variant that must run with reasoning enabled
pub const THINKING_SUFFIX: &str = ":thinking";

/// Parameters controlling text generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Reasoning ("thinking") configuration for a single call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Token budget; `-1` lets the model decide, `None` leaves the provider default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tokens: Option<i32>,
    /// Whether thought summaries are streamed back
    #[serde(default = "default_include_thoughts")]
    pub include_thoughts: bool,
}

const fn default_include_thoughts() -> bool {
    true
}

impl ReasoningConfig {
    /// Model picks its own budget and streams thoughts
    pub const fn dynamic() -> Self {
        Self {
            budget_tokens: Some(-1),
            include_thoughts: true,
        }
    }

    /// Fixed token budget with thoughts streamed back
    pub const fn with_budget(budget_tokens: i32) -> Self {
        Self {
            budget_tokens: Some(budget_tokens),
            include_thoughts: true,
        }
    }
}

/// Canonical streaming chat request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier, optionally ending in `:thinking`
    pub model: String,
    /// System instruction text
    #[serde(default)]
    pub system: String,
    /// Conversation messages in order
    pub messages: Vec<Message>,
    /// Tools available to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    /// How the model should select tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Generation parameters
    #[serde(default)]
    pub params: GenerationParams,
    /// Reasoning configuration for this call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>,
    /// Thought signature captured from a previous response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl ChatRequest {
    /// Request for `model` with a system instruction and messages
    pub fn new(model: impl Into<String>, system: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            messages,
            ..Self::default()
        }
    }

    /// Model id as sent in the URL, without the `:thinking` suffix
    pub fn model_name(&self) -> &str {
        self.model.strip_suffix(THINKING_SUFFIX).unwrap_or(&self.model)
    }

    /// Reasoning configuration in effect for this call
    ///
    /// A `:thinking` model always runs with reasoning, falling back to
    /// [`ReasoningConfig::dynamic`] when none was given.
    pub fn effective_reasoning(&self) -> Option<ReasoningConfig> {
        match (&self.reasoning, self.model.ends_with(THINKING_SUFFIX)) {
            (Some(config), _) => Some(config.clone()),
            (None, true) => Some(ReasoningConfig::dynamic()),
            (None, false) => None,
        }
    }
}
