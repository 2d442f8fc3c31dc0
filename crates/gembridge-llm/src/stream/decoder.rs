//! Incremental extraction of JSON objects from an unframed byte stream
//!
//! Gemini streams a sequence of complete JSON objects with no delimiter and
//! no line framing, and the transport splits it at arbitrary byte offsets.
//! [`DecoderState`] scans bytes once, tracking string/escape state and brace
//! depth across chunks, and yields each top-level object as soon as its
//! closing brace arrives.
//!
//! Structural characters are all ASCII and never occur inside a multi-byte
//! UTF-8 sequence, so the scan is safe on raw bytes even when a chunk ends in
//! the middle of a character.

use serde_json::Value;

use super::report::ErrorReporter;
use crate::error::DecodeError;

/// Longest prefix of a bad span included in a [`DecodeError`]
const SNIPPET_LEN: usize = 120;

/// Scanner state owned by one decoding session
#[derive(Debug, Default)]
pub struct DecoderState {
    /// Bytes received but not yet consumed
    buffer: Vec<u8>,
    /// Next byte of `buffer` to scan
    cursor: usize,
    /// Inside a string literal
    in_string: bool,
    /// Previous byte was a backslash inside a string
    escaped: bool,
    /// Brace depth outside strings
    depth: usize,
    /// Offset of the `{` opening the object in progress
    object_start: Option<usize>,
}

impl DecoderState {
    /// Fresh state for a new session
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every object it completes, in order
    ///
    /// Spans that balance but fail to parse are reported and skipped.
    pub fn feed(&mut self, chunk: &[u8], reporter: &dyn ErrorReporter) -> Vec<Value> {
        self.buffer.extend_from_slice(chunk);
        let mut objects = Vec::new();

        while self.cursor < self.buffer.len() {
            let byte = self.buffer[self.cursor];

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                self.cursor += 1;
                continue;
            }

            match byte {
                b'"' if self.object_start.is_some() => self.in_string = true,
                b'{' => {
                    if self.depth == 0 {
                        self.object_start = Some(self.cursor);
                    }
                    self.depth += 1;
                }
                b'}' if self.depth > 0 => {
                    self.depth -= 1;
                    if self.depth == 0
                        && let Some(start) = self.object_start.take()
                    {
                        let end = self.cursor + 1;
                        match serde_json::from_slice::<Value>(&self.buffer[start..end]) {
                            Ok(value) => objects.push(value),
                            Err(e) => reporter.report(&DecodeError::Malformed {
                                message: e.to_string(),
                                snippet: snippet(&self.buffer[start..end]),
                            }),
                        }
                        // Consumed or skipped, the span is gone either way
                        self.buffer.drain(..end);
                        self.cursor = 0;
                        continue;
                    }
                }
                _ => {}
            }

            self.cursor += 1;
        }

        self.compact();
        objects
    }

    /// End the session, reporting an object left incomplete
    pub fn finish(&mut self, reporter: &dyn ErrorReporter) {
        if let Some(start) = self.object_start.take() {
            let pending = &self.buffer[start..];
            reporter.report(&DecodeError::Truncated {
                len: pending.len(),
                snippet: snippet(pending),
            });
        }
        *self = Self::default();
    }

    /// Bytes currently retained
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether an object is partially received
    pub const fn in_object(&self) -> bool {
        self.object_start.is_some()
    }

    /// Drop scanned bytes that cannot belong to an object
    ///
    /// Keeps `object_start` valid by shifting it to the front of the buffer.
    fn compact(&mut self) {
        match self.object_start {
            None => {
                self.buffer.clear();
                self.cursor = 0;
            }
            Some(start) if start > 0 => {
                self.buffer.drain(..start);
                self.cursor -= start;
                self.object_start = Some(0);
            }
            Some(_) => {}
        }
    }
}

fn snippet(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}
