//! Provider trait and the Gemini transport

pub mod google;

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::LlmError;
use crate::stream::MetadataHandle;
use crate::types::{ChatRequest, StreamEvent};

pub use google::{Credential, GeminiProvider};

/// Boxed event sequence returned by a provider
pub type EventBox = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Streaming response of one call
///
/// Dropping it before the end releases the underlying connection.
pub struct ChatStream {
    events: EventBox,
    metadata: MetadataHandle,
}

impl ChatStream {
    /// Wrap an event sequence and the handle to its metadata
    pub const fn new(events: EventBox, metadata: MetadataHandle) -> Self {
        Self { events, metadata }
    }

    /// Response id and thought signature captured so far
    pub fn metadata(&self) -> MetadataHandle {
        self.metadata.clone()
    }
}

impl Stream for ChatStream {
    type Item = Result<StreamEvent, LlmError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.as_mut().poll_next(cx)
    }
}

/// A backend that can stream chat completions
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Send a request and stream the response
    ///
    /// Errors before the first event (bad status, missing body, untranslatable
    /// conversation) are returned here; later failures arrive in the stream.
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatStream, LlmError>;
}
