//! Streaming response pipeline
//!
//! Bytes from the transport go through [`DecoderState`] to become JSON
//! objects, then through [`ResponseTranslator`] to become [`StreamEvent`]s.
//! [`EventStream`] runs both lazily: nothing is read from the body until the
//! caller polls for the next event.

pub mod decoder;
pub mod report;
pub mod translator;

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};

pub use decoder::DecoderState;
pub use report::{ErrorReporter, TracingReporter};
pub use translator::{MetadataHandle, ResponseTranslator};

use crate::error::{DecodeError, LlmError};
use crate::types::StreamEvent;

/// Lazy sequence of events decoded from a response body
///
/// Owns the body stream. It is dropped as soon as the body ends or fails,
/// and with the `EventStream` itself if the caller stops early.
pub struct EventStream<S> {
    body: Option<S>,
    decoder: DecoderState,
    translator: ResponseTranslator,
    reporter: Arc<dyn ErrorReporter>,
    pending: VecDeque<StreamEvent>,
    done: bool,
}

impl<S> EventStream<S> {
    /// Stream events out of `body`
    pub fn new(body: S, translator: ResponseTranslator, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            body: Some(body),
            decoder: DecoderState::new(),
            translator,
            reporter,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Handle for reading response metadata during or after consumption
    pub fn metadata(&self) -> MetadataHandle {
        self.translator.metadata()
    }

    /// Whether the body is still held open
    pub const fn is_reading(&self) -> bool {
        self.body.is_some()
    }

    fn ingest(&mut self, chunk: &[u8]) {
        for object in self.decoder.feed(chunk, self.reporter.as_ref()) {
            self.translate(object);
        }
    }

    fn translate(&mut self, object: serde_json::Value) {
        let snippet = object.to_string();
        match self.translator.translate(object) {
            Ok(events) => self.pending.extend(events),
            Err(e) => self.reporter.report(&DecodeError::Malformed {
                message: e.to_string(),
                snippet,
            }),
        }
    }

    fn end_of_body(&mut self) {
        self.body = None;
        self.decoder.finish(self.reporter.as_ref());
        self.pending.extend(self.translator.finish());
        self.done = true;
    }
}

impl<S, B, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    type Item = Result<StreamEvent, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if this.done {
                return Poll::Ready(None);
            }
            let Some(body) = this.body.as_mut() else {
                this.done = true;
                return Poll::Ready(None);
            };

            match body.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => this.ingest(chunk.as_ref()),
                Poll::Ready(Some(Err(e))) => {
                    this.body = None;
                    this.done = true;
                    tracing::warn!(error = %e, "response stream failed");
                    return Poll::Ready(Some(Err(LlmError::Streaming(e.to_string()))));
                }
                Poll::Ready(None) => this.end_of_body(),
            }
        }
    }
}
