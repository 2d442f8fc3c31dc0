//! Conversion of decoded Gemini response objects into stream events

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Value;
use tokio::sync::watch;

use crate::pricing::CostEstimator;
use crate::protocol::google::{
    GoogleFunctionCall, GoogleGroundingMetadata, GoogleResponse, GoogleResponsePart, GoogleUsageMetadata,
};
use crate::types::{GroundingSource, ResponseMetadata, StreamEvent, ToolCallDelta, Usage};

/// Matches `<think>` / `</think>` tags, any case, with optional attributes
fn think_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<\s*(/)?\s*think(?:\s[^>]*)?>").expect("must be valid regex"))
}

/// Longest unterminated tag held back while waiting for more text
const MAX_PENDING_TAG: usize = 256;

/// Byte offset of a trailing `<` that may still grow into a think tag
fn partial_tag_start(tail: &str) -> Option<usize> {
    let start = tail.rfind('<')?;
    let candidate = &tail[start + 1..];
    if candidate.contains('>') || candidate.len() > MAX_PENDING_TAG {
        return None;
    }

    let rest = candidate.trim_start();
    let rest = rest.strip_prefix('/').unwrap_or(rest).trim_start().to_ascii_lowercase();
    let plausible = if rest.len() <= "think".len() {
        "think".starts_with(&rest)
    } else {
        rest.strip_prefix("think")
            .is_some_and(|attrs| attrs.starts_with(char::is_whitespace))
    };
    plausible.then_some(start)
}

/// Read access to the metadata captured by a session
///
/// Clones share the same session and see updates as objects are decoded.
#[derive(Debug, Clone)]
pub struct MetadataHandle {
    rx: watch::Receiver<ResponseMetadata>,
}

impl MetadataHandle {
    /// Snapshot of the metadata captured so far
    pub fn current(&self) -> ResponseMetadata {
        self.rx.borrow().clone()
    }

    /// Response id, once seen
    pub fn response_id(&self) -> Option<String> {
        self.rx.borrow().response_id.clone()
    }

    /// Latest thought signature, once seen
    pub fn thought_signature(&self) -> Option<String> {
        self.rx.borrow().thought_signature.clone()
    }
}

/// Per-session translation state
///
/// Owns everything that must survive across decoded objects: the
/// inside-`<think>` flag and any tag cut off at the end of a part, the tool
/// call counter, accumulated grounding sources and captured metadata. One
/// translator serves exactly one response.
pub struct ResponseTranslator {
    model: String,
    cost: Arc<dyn CostEstimator>,
    in_thinking: bool,
    pending_tag: String,
    tool_calls: u32,
    grounding: Vec<GroundingSource>,
    metadata: watch::Sender<ResponseMetadata>,
}

impl ResponseTranslator {
    /// Translator for a response from `model`, pricing usage with `cost`
    pub fn new(model: impl Into<String>, cost: Arc<dyn CostEstimator>) -> Self {
        let (metadata, _) = watch::channel(ResponseMetadata::default());
        Self {
            model: model.into(),
            cost,
            in_thinking: false,
            pending_tag: String::new(),
            tool_calls: 0,
            grounding: Vec::new(),
            metadata,
        }
    }

    /// Handle for reading captured metadata
    pub fn metadata(&self) -> MetadataHandle {
        MetadataHandle {
            rx: self.metadata.subscribe(),
        }
    }

    /// Translate one decoded response object
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not have the response shape.
    pub fn translate(&mut self, object: Value) -> Result<Vec<StreamEvent>, serde_json::Error> {
        let response: GoogleResponse = serde_json::from_value(object)?;
        let mut events = Vec::new();

        if let Some(id) = response.response_id {
            self.metadata.send_modify(|m| m.response_id = Some(id));
        }

        if let Some(candidate) = response.candidates.into_iter().next() {
            if let Some(content) = candidate.content {
                for part in content.parts {
                    self.translate_part(part, &mut events);
                }
            }
            if let Some(grounding) = candidate.grounding_metadata {
                self.collect_grounding(grounding);
            }
        }

        if let Some(grounding) = response.grounding_metadata {
            self.collect_grounding(grounding);
        }

        if let Some(usage) = response.usage_metadata {
            events.push(StreamEvent::Usage(self.usage(&usage)));
        }

        Ok(events)
    }

    /// Events owed once the response has ended
    ///
    /// Emits any held-back partial tag as plain content, the accumulated
    /// grounding sources, then a snapshot of the captured metadata. Each only
    /// if there is something to report.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        self.flush_pending_tag(&mut events);

        if !self.grounding.is_empty() {
            events.push(StreamEvent::Grounding {
                sources: std::mem::take(&mut self.grounding),
            });
        }

        let metadata = self.metadata.borrow().clone();
        if !metadata.is_empty() {
            events.push(StreamEvent::ResponseMetadata(metadata));
        }

        events
    }

    fn translate_part(&mut self, part: GoogleResponsePart, events: &mut Vec<StreamEvent>) {
        if let Some(signature) = part.thought_signature {
            self.metadata.send_modify(|m| m.thought_signature = Some(signature));
        }

        let thought = part.thought == Some(true);

        if !thought && let Some(text) = part.text {
            self.split_thinking(&text, events);
            return;
        }

        self.flush_pending_tag(events);
        if let Some(text) = part.text {
            if !text.is_empty() {
                events.push(StreamEvent::reasoning(text));
            }
        } else if let Some(call) = part.function_call {
            self.tool_call(call, events);
        } else if !part.other.is_empty() {
            tracing::debug!(
                keys = ?part.other.keys().collect::<Vec<_>>(),
                "skipping unsupported response part"
            );
        }
    }

    /// Split text on think tags, alternating reasoning and answer text
    ///
    /// A trailing fragment that may be the start of a tag is held back and
    /// prepended to the next text part.
    fn split_thinking(&mut self, text: &str, events: &mut Vec<StreamEvent>) {
        let text = std::mem::take(&mut self.pending_tag) + text;
        let mut last_end = 0;

        for tag in think_tag().captures_iter(&text) {
            let Some(overall) = tag.get(0) else { continue };
            self.push_segment(&text[last_end..overall.start()], events);
            self.in_thinking = tag.get(1).is_none();
            last_end = overall.end();
        }

        let tail = &text[last_end..];
        match partial_tag_start(tail) {
            Some(at) => {
                self.push_segment(&tail[..at], events);
                self.pending_tag = tail[at..].to_owned();
            }
            None => self.push_segment(tail, events),
        }
    }

    fn flush_pending_tag(&mut self, events: &mut Vec<StreamEvent>) {
        let pending = std::mem::take(&mut self.pending_tag);
        self.push_segment(&pending, events);
    }

    fn push_segment(&self, segment: &str, events: &mut Vec<StreamEvent>) {
        if segment.is_empty() {
            return;
        }
        events.push(if self.in_thinking {
            StreamEvent::reasoning(segment)
        } else {
            StreamEvent::text(segment)
        });
    }

    /// Disclose a function call as a name delta followed by an arguments delta
    fn tool_call(&mut self, call: GoogleFunctionCall, events: &mut Vec<StreamEvent>) {
        let index = self.tool_calls;
        self.tool_calls += 1;
        let id = format!("{}-{index}", call.name);

        events.push(StreamEvent::ToolCallPartial(ToolCallDelta {
            index,
            id: Some(id.clone()),
            name: Some(call.name),
            arguments: None,
        }));
        events.push(StreamEvent::ToolCallPartial(ToolCallDelta {
            index,
            id: Some(id),
            name: None,
            arguments: Some(call.args.to_string()),
        }));
    }

    fn collect_grounding(&mut self, grounding: GoogleGroundingMetadata) {
        for chunk in grounding.grounding_chunks {
            let Some(web) = chunk.web else { continue };
            let Some(url) = web.uri else { continue };
            if self.grounding.iter().any(|s| s.url == url) {
                continue;
            }
            let title = web.title.unwrap_or_else(|| url.clone());
            self.grounding.push(GroundingSource { title, url });
        }
    }

    fn usage(&self, raw: &GoogleUsageMetadata) -> Usage {
        let mut usage = Usage {
            input_tokens: raw.prompt_token_count,
            output_tokens: raw.candidates_token_count,
            reasoning_tokens: raw.thoughts_token_count,
            cached_input_tokens: raw.cached_content_token_count,
            total_cost: None,
        };
        usage.total_cost = self.cost.estimate(&self.model, &usage);
        usage
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::pricing::{FlatRate, NoPricing};

    fn translator() -> ResponseTranslator {
        ResponseTranslator::new("gemini-2.5-pro", Arc::new(FlatRate::new(1.25, 10.0)))
    }

    fn text_object(text: &str) -> Value {
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
    }

    fn translate_all(translator: &mut ResponseTranslator, objects: Vec<Value>) -> Vec<StreamEvent> {
        objects
            .into_iter()
            .flat_map(|o| translator.translate(o).unwrap())
            .collect()
    }

    #[test]
    fn plain_text_becomes_text_events() {
        let mut t = translator();
        let events = translate_all(&mut t, vec![text_object("Hello"), text_object(" world")]);
        assert_eq!(events, vec![StreamEvent::text("Hello"), StreamEvent::text(" world")]);
    }

    #[test]
    fn thinking_span_persists_across_objects() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![
                text_object("<think>This is a thought"),
                text_object(" still thinking</think>"),
                text_object("This is the response"),
            ],
        );
        assert_eq!(
            events,
            vec![
                StreamEvent::reasoning("This is a thought"),
                StreamEvent::reasoning(" still thinking"),
                StreamEvent::text("This is the response"),
            ]
        );
    }

    #[test]
    fn think_tags_split_across_objects_are_recognised() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![text_object("<thi"), text_object("nk>secret plan</th"), text_object("ink>answer")],
        );
        assert_eq!(
            events,
            vec![StreamEvent::reasoning("secret plan"), StreamEvent::text("answer")]
        );
    }

    #[test]
    fn partial_tag_with_attributes_waits_for_the_closing_bracket() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![text_object("ok <THINK mo"), text_object("de=\"deep\">inner")],
        );
        assert_eq!(events, vec![StreamEvent::text("ok "), StreamEvent::reasoning("inner")]);
    }

    #[test]
    fn lone_angle_brackets_are_not_held_back() {
        let mut t = translator();
        let events = translate_all(&mut t, vec![text_object("if a <b then"), text_object(" x < y")]);
        assert_eq!(
            events,
            vec![StreamEvent::text("if a <b then"), StreamEvent::text(" x < y")]
        );
    }

    #[test]
    fn unfinished_tag_is_flushed_as_content() {
        let mut t = translator();
        let mut events = translate_all(&mut t, vec![text_object("trailing <th")]);
        assert_eq!(events, vec![StreamEvent::text("trailing ")]);

        events.extend(t.finish());
        assert_eq!(
            events,
            vec![StreamEvent::text("trailing "), StreamEvent::text("<th")]
        );
    }

    #[test]
    fn held_back_fragment_precedes_a_following_tool_call() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![json!({"candidates": [{"content": {"parts": [
                {"text": "see <"},
                {"functionCall": {"name": "f", "args": {}}}
            ]}}]})],
        );
        assert_eq!(events[..2], [StreamEvent::text("see "), StreamEvent::text("<")]);
        assert!(matches!(&events[2], StreamEvent::ToolCallPartial(ToolCallDelta { index: 0, .. })));
    }

    #[test]
    fn think_tags_ignore_case_and_attributes() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![text_object("before<THINK mode=\"deep\">inside</Think>after")],
        );
        assert_eq!(
            events,
            vec![
                StreamEvent::text("before"),
                StreamEvent::reasoning("inside"),
                StreamEvent::text("after"),
            ]
        );
    }

    #[test]
    fn thought_parts_are_reasoning() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![json!({"candidates": [{"content": {"parts": [
                {"text": "pondering <think>tags stay literal", "thought": true},
                {"text": "answer"}
            ]}}]})],
        );
        assert_eq!(
            events,
            vec![
                StreamEvent::reasoning("pondering <think>tags stay literal"),
                StreamEvent::text("answer"),
            ]
        );
    }

    #[test]
    fn function_calls_are_disclosed_in_two_phases() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![
                json!({"candidates": [{"content": {"parts": [
                    {"functionCall": {"name": "read_file", "args": {"path": "a.rs"}}}
                ]}}]}),
                json!({"candidates": [{"content": {"parts": [
                    {"functionCall": {"name": "list_dir", "args": {}}}
                ]}}]}),
            ],
        );

        assert_eq!(
            events,
            vec![
                StreamEvent::ToolCallPartial(ToolCallDelta {
                    index: 0,
                    id: Some("read_file-0".to_owned()),
                    name: Some("read_file".to_owned()),
                    arguments: None,
                }),
                StreamEvent::ToolCallPartial(ToolCallDelta {
                    index: 0,
                    id: Some("read_file-0".to_owned()),
                    name: None,
                    arguments: Some(r#"{"path":"a.rs"}"#.to_owned()),
                }),
                StreamEvent::ToolCallPartial(ToolCallDelta {
                    index: 1,
                    id: Some("list_dir-1".to_owned()),
                    name: Some("list_dir".to_owned()),
                    arguments: None,
                }),
                StreamEvent::ToolCallPartial(ToolCallDelta {
                    index: 1,
                    id: Some("list_dir-1".to_owned()),
                    name: None,
                    arguments: Some("{}".to_owned()),
                }),
            ]
        );
    }

    #[test]
    fn function_call_without_args_has_empty_object_arguments() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![json!({"candidates": [{"content": {"parts": [{"functionCall": {"name": "list"}}]}}]})],
        );
        assert_eq!(
            events[1],
            StreamEvent::ToolCallPartial(ToolCallDelta {
                index: 0,
                id: Some("list-0".to_owned()),
                name: None,
                arguments: Some("{}".to_owned()),
            })
        );
    }

    #[test]
    fn thought_flagged_function_call_is_not_dropped() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![json!({"candidates": [{"content": {"parts": [
                {"functionCall": {"name": "search", "args": {"q": "rust"}}, "thought": true}
            ]}}]})],
        );
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            StreamEvent::ToolCallPartial(ToolCallDelta { name: Some(name), .. }) if name == "search"
        ));
    }

    #[test]
    fn usage_metadata_emits_one_priced_usage_event() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![json!({"usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}})],
        );

        assert_eq!(events.len(), 1);
        let StreamEvent::Usage(usage) = &events[0] else {
            panic!("expected usage, got {:?}", events[0]);
        };
        assert_eq!(usage.input_tokens, 10);
        assert_eq!(usage.output_tokens, 5);
        assert!(usage.total_cost.is_some_and(f64::is_finite));
    }

    #[test]
    fn snake_case_usage_metadata_is_accepted() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![json!({"usage_metadata": {
                "prompt_token_count": 7,
                "candidates_token_count": 3,
                "thoughts_token_count": 2,
                "cached_content_token_count": 4
            }})],
        );

        let [StreamEvent::Usage(usage)] = events.as_slice() else {
            panic!("expected a single usage event, got {events:?}");
        };
        assert_eq!(usage.input_tokens, 7);
        assert_eq!(usage.output_tokens, 3);
        assert_eq!(usage.reasoning_tokens, Some(2));
        assert_eq!(usage.cached_input_tokens, Some(4));
    }

    #[test]
    fn usage_without_pricing_has_no_cost() {
        let mut t = ResponseTranslator::new("m", Arc::new(NoPricing));
        let events = translate_all(
            &mut t,
            vec![json!({"usageMetadata": {"promptTokenCount": 1, "candidatesTokenCount": 1}})],
        );
        assert!(matches!(&events[..], [StreamEvent::Usage(Usage { total_cost: None, .. })]));
    }

    #[test]
    fn missing_candidates_yield_no_content_events() {
        let mut t = translator();
        let events = translate_all(&mut t, vec![json!({}), json!({"candidates": []})]);
        assert!(events.is_empty());
        assert!(t.finish().is_empty());
    }

    #[test]
    fn grounding_is_accumulated_and_emitted_once_at_finish() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![
                json!({
                    "candidates": [{
                        "content": {"parts": [{"text": "Rust 1.0 shipped in 2015."}]},
                        "groundingMetadata": {"groundingChunks": [
                            {"web": {"uri": "https://blog.rust-lang.org/", "title": "Rust Blog"}}
                        ]}
                    }]
                }),
                json!({
                    "groundingMetadata": {"groundingChunks": [
                        {"web": {"uri": "https://blog.rust-lang.org/", "title": "Rust Blog"}},
                        {"web": {"uri": "https://en.wikipedia.org/wiki/Rust"}},
                        {"retrievedContext": {"uri": "gs://ignored"}}
                    ]}
                }),
            ],
        );
        assert_eq!(events, vec![StreamEvent::text("Rust 1.0 shipped in 2015.")]);

        let tail = t.finish();
        assert_eq!(
            tail,
            vec![StreamEvent::Grounding {
                sources: vec![
                    GroundingSource {
                        title: "Rust Blog".to_owned(),
                        url: "https://blog.rust-lang.org/".to_owned(),
                    },
                    GroundingSource {
                        title: "https://en.wikipedia.org/wiki/Rust".to_owned(),
                        url: "https://en.wikipedia.org/wiki/Rust".to_owned(),
                    },
                ],
            }]
        );
    }

    #[test]
    fn metadata_is_captured_outside_the_event_sequence() {
        let mut t = translator();
        let handle = t.metadata();

        let events = translate_all(
            &mut t,
            vec![json!({
                "responseId": "resp-42",
                "candidates": [{"content": {"parts": [
                    {"text": "hidden", "thought": true, "thoughtSignature": "sig-1"},
                    {"functionCall": {"name": "f", "args": {}}, "thoughtSignature": "sig-2"}
                ]}}]
            })],
        );

        assert!(!events.iter().any(|e| matches!(e, StreamEvent::ResponseMetadata(_))));
        assert_eq!(handle.response_id().as_deref(), Some("resp-42"));
        assert_eq!(handle.thought_signature().as_deref(), Some("sig-2"));

        let tail = t.finish();
        assert_eq!(
            tail,
            vec![StreamEvent::ResponseMetadata(ResponseMetadata {
                response_id: Some("resp-42".to_owned()),
                thought_signature: Some("sig-2".to_owned()),
            })]
        );
    }

    #[test]
    fn unsupported_parts_are_skipped() {
        let mut t = translator();
        let events = translate_all(
            &mut t,
            vec![json!({"candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                {"text": "done"}
            ]}}]})],
        );
        assert_eq!(events, vec![StreamEvent::text("done")]);
    }

    #[test]
    fn wrongly_shaped_object_is_an_error() {
        let mut t = translator();
        assert!(t.translate(json!({"candidates": "not a list"})).is_err());
    }
}
