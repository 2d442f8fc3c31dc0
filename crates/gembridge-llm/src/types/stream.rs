use serde::{Deserialize, Serialize};

/// Typed event produced while consuming a response stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Answer text
    Text {
        /// Text fragment
        text: String,
    },
    /// Model thinking, out-of-band from the answer
    Reasoning {
        /// Reasoning fragment
        text: String,
    },
    /// Incremental disclosure of one tool invocation
    ToolCallPartial(ToolCallDelta),
    /// Token usage for the response so far
    Usage(Usage),
    /// Sources backing the answer
    Grounding {
        /// Sources in the order the provider listed them
        sources: Vec<GroundingSource>,
    },
    /// Final snapshot of the session metadata
    ResponseMetadata(ResponseMetadata),
}

impl StreamEvent {
    /// Text event
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Reasoning event
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::Reasoning { text: text.into() }
    }
}

/// Partial tool call data
///
/// The first delta for an index carries `name`, later ones carry
/// `arguments`. `id` is the same on both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    /// Tool call index within the session
    pub index: u32,
    /// Tool call id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name (first delta only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Serialized arguments fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub input_tokens: u32,
    /// Tokens generated in the response
    pub output_tokens: u32,
    /// Tokens spent on thinking, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
    /// Prompt tokens served from cache, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input_tokens: Option<u32>,
    /// Estimated cost in USD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

/// A single grounding citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    /// Page title
    pub title: String,
    /// Source URL
    pub url: String,
}

/// Metadata captured from the response outside the event sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Provider response id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    /// Opaque reasoning-continuation token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl ResponseMetadata {
    /// Whether nothing has been captured yet
    pub const fn is_empty(&self) -> bool {
        self.response_id.is_none() && self.thought_signature.is_none()
    }
}
