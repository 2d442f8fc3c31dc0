//! Google Generative Language API wire format types

use serde::{Deserialize, Serialize};

// -- Request types --

/// Google `streamGenerateContent` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    /// System instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GoogleContent>,
    /// Conversation contents
    pub contents: Vec<GoogleContent>,
    /// Tool definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GoogleTool>>,
    /// Tool configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<GoogleToolConfig>,
    /// Generation configuration
    pub generation_config: GoogleGenerationConfig,
    /// Safety settings, one per harm category
    pub safety_settings: Vec<GoogleSafetySetting>,
}

/// Role of a content object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoogleRole {
    /// End user
    User,
    /// Model turn
    Model,
    /// Tool results
    Function,
}

/// Google content object containing role and parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleContent {
    /// Role (absent for the system instruction)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<GoogleRole>,
    /// Content parts
    pub parts: Vec<GooglePart>,
}

/// Individual part within a request content object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePart {
    /// Part payload
    #[serde(flatten)]
    pub data: GooglePartData,
    /// Reasoning-continuation token echoed back to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl GooglePart {
    /// Text part
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            data: GooglePartData::Text(text.into()),
            thought_signature: None,
        }
    }

    /// Function call part
    pub const fn function_call(call: GoogleFunctionCall) -> Self {
        Self {
            data: GooglePartData::FunctionCall(call),
            thought_signature: None,
        }
    }

    /// Function response part
    pub const fn function_response(response: GoogleFunctionResponse) -> Self {
        Self {
            data: GooglePartData::FunctionResponse(response),
            thought_signature: None,
        }
    }
}

/// Payload of a request part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GooglePartData {
    /// Text content
    Text(String),
    /// Function call from the model
    FunctionCall(GoogleFunctionCall),
    /// Function response from the user
    FunctionResponse(GoogleFunctionResponse),
}

/// Function call from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleFunctionCall {
    /// Function name
    pub name: String,
    /// Function arguments as JSON; an empty object when omitted
    #[serde(default = "empty_args")]
    pub args: serde_json::Value,
}

fn empty_args() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Function response sent back to the model
///
/// `response` never repeats `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleFunctionResponse {
    /// Function name
    pub name: String,
    /// Response payload, always `{"content": ...}`
    pub response: serde_json::Value,
}

/// Generation configuration parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleGenerationConfig {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Maximum output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// Thinking configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<GoogleThinkingConfig>,
}

/// Thinking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleThinkingConfig {
    /// Token budget; `-1` for dynamic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i32>,
    /// Whether thought summaries are returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_thoughts: Option<bool>,
}

/// Harm categories covered by the fixed safety settings
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Threshold applied to every harm category
pub const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Safety setting for one harm category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSafetySetting {
    /// Harm category
    pub category: String,
    /// Block threshold
    pub threshold: String,
}

impl GoogleSafetySetting {
    /// The fixed settings sent with every request
    pub fn defaults() -> Vec<Self> {
        HARM_CATEGORIES
            .iter()
            .map(|category| Self {
                category: (*category).to_owned(),
                threshold: SAFETY_THRESHOLD.to_owned(),
            })
            .collect()
    }
}

/// Google tool definition wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTool {
    /// Function declarations
    pub function_declarations: Vec<GoogleFunctionDeclaration>,
}

/// Google function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleFunctionDeclaration {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sanitized parameter schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Google tool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleToolConfig {
    /// Function calling config
    pub function_calling_config: GoogleFunctionCallingConfig,
}

/// Function calling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleFunctionCallingConfig {
    /// Mode: "AUTO", "ANY", "NONE"
    pub mode: String,
    /// Allowed function names (when mode is "ANY")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_function_names: Option<Vec<String>>,
}

// -- Response types --

/// One object of a `streamGenerateContent` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<GoogleCandidate>,
    /// Token usage metadata
    #[serde(default, alias = "usage_metadata")]
    pub usage_metadata: Option<GoogleUsageMetadata>,
    /// Response identifier
    #[serde(default, alias = "response_id")]
    pub response_id: Option<String>,
    /// Grounding metadata at the top level
    #[serde(default, alias = "grounding_metadata")]
    pub grounding_metadata: Option<GoogleGroundingMetadata>,
}

/// Generated candidate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCandidate {
    /// Generated content
    #[serde(default)]
    pub content: Option<GoogleResponseContent>,
    /// Finish reason
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Grounding metadata attached to the candidate
    #[serde(default)]
    pub grounding_metadata: Option<GoogleGroundingMetadata>,
}

/// Content of a generated candidate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleResponseContent {
    /// Role, normally "model"
    #[serde(default)]
    pub role: Option<String>,
    /// Content parts
    #[serde(default)]
    pub parts: Vec<GoogleResponsePart>,
}

/// Part of a generated candidate
///
/// Parts arrive as loosely shaped objects; the translator classifies them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleResponsePart {
    /// Text payload
    #[serde(default)]
    pub text: Option<String>,
    /// Marks the text as a thought summary
    #[serde(default)]
    pub thought: Option<bool>,
    /// Function call payload
    #[serde(default)]
    pub function_call: Option<GoogleFunctionCall>,
    /// Reasoning-continuation token
    #[serde(default)]
    pub thought_signature: Option<String>,
    /// Payloads the translator does not handle
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Token usage metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUsageMetadata {
    /// Prompt token count
    #[serde(default, alias = "prompt_token_count")]
    pub prompt_token_count: u32,
    /// Candidates token count
    #[serde(default, alias = "candidates_token_count")]
    pub candidates_token_count: u32,
    /// Total token count
    #[serde(default, alias = "total_token_count")]
    pub total_token_count: u32,
    /// Thinking token count
    #[serde(default, alias = "thoughts_token_count")]
    pub thoughts_token_count: Option<u32>,
    /// Cached prompt token count
    #[serde(default, alias = "cached_content_token_count")]
    pub cached_content_token_count: Option<u32>,
}

/// Grounding metadata
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleGroundingMetadata {
    /// Retrieved chunks backing the answer
    #[serde(default)]
    pub grounding_chunks: Vec<GoogleGroundingChunk>,
}

/// A single grounding chunk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleGroundingChunk {
    /// Web source, when the chunk came from search
    #[serde(default)]
    pub web: Option<GoogleWebSource>,
}

/// Web source of a grounding chunk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleWebSource {
    /// Source URI
    #[serde(default)]
    pub uri: Option<String>,
    /// Page title
    #[serde(default)]
    pub title: Option<String>,
}

// -- Error response --

/// Google error response
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorResponse {
    /// Error details
    pub error: GoogleErrorDetail,
}

/// Google error detail
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorDetail {
    /// HTTP status code
    #[serde(default)]
    pub code: u32,
    /// Error message
    #[serde(default)]
    pub message: String,
    /// Error status string
    #[serde(default)]
    pub status: String,
}
