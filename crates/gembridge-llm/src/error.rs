use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the Gemini API
#[derive(Debug, Error)]
pub enum LlmError {
    /// Upstream returned a non-success status
    #[error("provider returned {status}: {body}")]
    Upstream {
        /// HTTP status code returned by the provider
        status: StatusCode,
        /// Raw response body text
        body: String,
    },

    /// Upstream accepted the request but sent no body to stream from
    #[error("provider returned an empty response body")]
    MissingBody,

    /// Connection failed before a response was received
    #[error("request failed: {0}")]
    Transport(String),

    /// Error while reading the response stream
    #[error("streaming error: {0}")]
    Streaming(String),

    /// A tool result refers to a tool call that never appeared in the conversation
    #[error("tool result references unknown tool call id `{id}`")]
    UnknownToolUse {
        /// The dangling tool call id
        id: String,
    },

    /// Neither an API key nor an access token is available
    #[error("no credentials configured: set `api_key` or `access_token`")]
    MissingCredentials,

    /// Caller built a request the provider cannot accept
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    /// Whether an outer retry wrapper may attempt this call again
    ///
    /// Nothing in this crate retries; the classification exists for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => status.is_server_error() || status.as_u16() == 429,
            Self::MissingBody | Self::Transport(_) | Self::Streaming(_) => true,
            Self::UnknownToolUse { .. } | Self::MissingCredentials | Self::InvalidRequest(_) => false,
        }
    }

    /// HTTP status reported by the provider, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A candidate object span that could not be turned into JSON
///
/// Decode errors are contained per object: they go to an
/// [`ErrorReporter`](crate::stream::ErrorReporter) and never end the stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A balanced `{ ... }` span failed to parse
    #[error("discarding malformed object ({message}): {snippet}")]
    Malformed {
        /// Parser error message
        message: String,
        /// Leading part of the discarded span
        snippet: String,
    },

    /// The stream ended in the middle of an object
    #[error("stream ended inside an incomplete object ({len} bytes): {snippet}")]
    Truncated {
        /// Bytes buffered for the incomplete object
        len: usize,
        /// Leading part of the incomplete span
        snippet: String,
    },
}
