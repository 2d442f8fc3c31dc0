//! Canonical, provider-neutral types for requests and streamed responses
//!
//! The Gemini wire format converts to and from these; nothing outside
//! `protocol` and `convert` sees the provider's shapes.

pub mod message;
pub mod request;
pub mod stream;
pub mod tool;

pub use message::{ContentBlock, Message, MessageKind, Role};
pub use request::{ChatRequest, GenerationParams, ReasoningConfig, THINKING_SUFFIX};
pub use stream::{GroundingSource, ResponseMetadata, StreamEvent, ToolCallDelta, Usage};
pub use tool::{ToolChoice, ToolDefinition};
