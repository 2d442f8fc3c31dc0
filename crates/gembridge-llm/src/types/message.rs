use serde::{Deserialize, Serialize};

/// Role of a conversation participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message (also carries tool results)
    User,
    /// Assistant response
    Assistant,
}

/// Whether a message is a real conversational turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Ordinary conversation turn
    #[default]
    Turn,
    /// Internal reasoning annotation kept by the caller, never sent upstream
    Reasoning,
}

/// Provider-neutral conversation message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Ordered content blocks
    pub content: Vec<ContentBlock>,
    /// Turn or internal annotation
    #[serde(default)]
    pub kind: MessageKind,
}

impl Message {
    /// User message with a single text block
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
            kind: MessageKind::Turn,
        }
    }

    /// Assistant message with a single text block
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::text(text)],
            kind: MessageKind::Turn,
        }
    }

    /// Message built from explicit blocks
    pub const fn with_blocks(role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            role,
            content,
            kind: MessageKind::Turn,
        }
    }

    /// Internal reasoning annotation
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::text(text)],
            kind: MessageKind::Reasoning,
        }
    }

    /// Whether any block is a tool result
    pub fn has_tool_result(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolResult { .. }))
    }
}

/// A single block of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text {
        /// The text string
        text: String,
    },
    /// Tool invocation requested by the assistant
    ToolUse {
        /// Caller-assigned call id
        id: String,
        /// Tool name
        name: String,
        /// Tool arguments
        input: serde_json::Value,
    },
    /// Result of a previous tool invocation
    ToolResult {
        /// Id of the `ToolUse` this result answers
        tool_use_id: String,
        /// Tool output
        content: String,
    },
}

impl ContentBlock {
    /// Text block
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Tool invocation block
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Tool result block
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }
}
