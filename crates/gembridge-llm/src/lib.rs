//! Streaming client for the Google Gemini API
//!
//! Translates provider-neutral chat requests into `streamGenerateContent`
//! calls and turns the unframed JSON response body into a lazy sequence of
//! typed events: answer text, reasoning, incremental tool calls, usage,
//! grounding sources and response metadata.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod pricing;
pub mod protocol;
pub mod provider;
pub mod schema;
pub mod stream;
pub mod types;

pub use error::{DecodeError, LlmError};
pub use pricing::{CostEstimator, FlatRate, NoPricing};
pub use provider::{ChatStream, Credential, GeminiProvider, Provider};
pub use schema::sanitize_schema;
pub use stream::{DecoderState, ErrorReporter, EventStream, MetadataHandle, ResponseTranslator, TracingReporter};
pub use types::{ChatRequest, ContentBlock, Message, StreamEvent};
