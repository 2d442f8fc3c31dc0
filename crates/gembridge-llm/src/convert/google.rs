//! Canonical request -> Google `streamGenerateContent` request body

use std::collections::HashMap;

use serde_json::json;

use crate::error::LlmError;
use crate::protocol::google::{
    GoogleContent, GoogleFunctionCall, GoogleFunctionCallingConfig, GoogleFunctionDeclaration, GoogleFunctionResponse,
    GoogleGenerationConfig, GooglePart, GooglePartData, GoogleRequest, GoogleRole, GoogleSafetySetting,
    GoogleThinkingConfig, GoogleTool, GoogleToolConfig,
};
use crate::schema::sanitize_schema;
use crate::types::{ChatRequest, ContentBlock, Message, MessageKind, ReasoningConfig, Role, ToolChoice, ToolDefinition};

/// Tool call id -> tool name, for every `ToolUse` in the conversation
type ToolIdentityMap<'a> = HashMap<&'a str, &'a str>;

/// Build the wire request for one call
///
/// Fails before anything is sent if a tool result references a call id that
/// no `ToolUse` block in the conversation declares.
pub fn build_request(request: &ChatRequest) -> Result<GoogleRequest, LlmError> {
    let messages: Vec<&Message> = request
        .messages
        .iter()
        .filter(|m| m.kind == MessageKind::Turn)
        .collect();

    let identities = tool_identities(&messages);
    let mut contents = messages
        .iter()
        .map(|message| message_to_content(message, &identities))
        .collect::<Result<Vec<_>, _>>()?;

    let reasoning = request.effective_reasoning();
    if reasoning.is_some()
        && let Some(signature) = &request.thought_signature
    {
        attach_thought_signature(&mut contents, signature);
    }

    let system_instruction = (!request.system.is_empty()).then(|| GoogleContent {
        role: None,
        parts: vec![GooglePart::text(request.system.as_str())],
    });

    let tools = request
        .tools
        .as_deref()
        .filter(|tools| !tools.is_empty())
        .map(|tools| {
            vec![GoogleTool {
                function_declarations: tools.iter().map(declaration).collect(),
            }]
        });

    Ok(GoogleRequest {
        system_instruction,
        contents,
        tools,
        tool_config: request.tool_choice.as_ref().map(tool_config),
        generation_config: generation_config(request, reasoning.as_ref()),
        safety_settings: GoogleSafetySetting::defaults(),
    })
}

fn tool_identities<'a>(messages: &[&'a Message]) -> ToolIdentityMap<'a> {
    let mut identities = HashMap::new();
    for block in messages.iter().flat_map(|m| &m.content) {
        if let ContentBlock::ToolUse { id, name, .. } = block {
            identities.entry(id.as_str()).or_insert(name.as_str());
        }
    }
    identities
}

fn message_to_content(message: &Message, identities: &ToolIdentityMap<'_>) -> Result<GoogleContent, LlmError> {
    let role = match message.role {
        Role::Assistant => GoogleRole::Model,
        Role::User if message.has_tool_result() => GoogleRole::Function,
        Role::User => GoogleRole::User,
    };

    let mut parts = Vec::with_capacity(message.content.len());
    for block in &message.content {
        match block {
            ContentBlock::Text { text } => {
                if !text.is_empty() {
                    parts.push(GooglePart::text(text.as_str()));
                }
            }
            ContentBlock::ToolUse { name, input, .. } => {
                parts.push(GooglePart::function_call(GoogleFunctionCall {
                    name: name.clone(),
                    args: input.clone(),
                }));
            }
            ContentBlock::ToolResult { tool_use_id, content } => {
                let Some(name) = identities.get(tool_use_id.as_str()) else {
                    tracing::warn!(tool_use_id = %tool_use_id, "tool result without a matching tool call");
                    return Err(LlmError::UnknownToolUse {
                        id: tool_use_id.clone(),
                    });
                };
                parts.push(GooglePart::function_response(GoogleFunctionResponse {
                    name: (*name).to_owned(),
                    response: json!({ "content": content }),
                }));
            }
        }
    }

    // Gemini rejects contents without parts
    if parts.is_empty() {
        parts.push(GooglePart::text(""));
    }

    Ok(GoogleContent {
        role: Some(role),
        parts,
    })
}

/// Put the signature on the last model turn, preferring its first function call
fn attach_thought_signature(contents: &mut [GoogleContent], signature: &str) {
    let Some(last_model) = contents
        .iter_mut()
        .rev()
        .find(|c| c.role == Some(GoogleRole::Model))
    else {
        return;
    };

    let position = last_model
        .parts
        .iter()
        .position(|p| matches!(p.data, GooglePartData::FunctionCall(_)))
        .unwrap_or(0);

    if let Some(part) = last_model.parts.get_mut(position) {
        part.thought_signature = Some(signature.to_owned());
    }
}

fn declaration(tool: &ToolDefinition) -> GoogleFunctionDeclaration {
    GoogleFunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: tool.parameters.as_ref().map(sanitize_schema),
    }
}

fn tool_config(choice: &ToolChoice) -> GoogleToolConfig {
    let (mode, allowed_function_names) = match choice {
        ToolChoice::Auto => ("AUTO", None),
        ToolChoice::None => ("NONE", None),
        ToolChoice::Required => ("ANY", None),
        ToolChoice::Function(name) => ("ANY", Some(vec![name.clone()])),
    };
    GoogleToolConfig {
        function_calling_config: GoogleFunctionCallingConfig {
            mode: mode.to_owned(),
            allowed_function_names,
        },
    }
}

fn generation_config(request: &ChatRequest, reasoning: Option<&ReasoningConfig>) -> GoogleGenerationConfig {
    let params = &request.params;
    GoogleGenerationConfig {
        temperature: params.temperature,
        top_p: params.top_p,
        top_k: params.top_k,
        max_output_tokens: params.max_tokens,
        stop_sequences: params.stop.clone(),
        thinking_config: reasoning.map(|r| GoogleThinkingConfig {
            thinking_budget: r.budget_tokens,
            include_thoughts: Some(r.include_thoughts),
        }),
    }
}
