use serde_json::Value;
use std::borrow::Cow;

use super::tags::{TagName, find_inner, strip_inner};
use crate::models::{BlockDraft, BlockKind, ToolUseParts};

const TOOL_CALL_PARTS: [&str; 3] = ["tool_name", "args", "tool_result"];

/// Replace a `{"#text": "..."}` envelope with its text.
///
/// Anything that is not a JSON object carrying a non-empty string under
/// `#text` is returned unchanged.
pub fn unwrap_text_envelope(body: &str) -> Cow<'_, str> {
    let trimmed = body.trim();
    if !trimmed.starts_with('{') {
        return Cow::Borrowed(body);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match map.get("#text") {
            Some(Value::String(s)) if !s.is_empty() => {
                tracing::debug!(len = s.len(), "Unwrapped #text envelope");
                Cow::Owned(s.clone())
            }
            _ => Cow::Borrowed(body),
        },
        _ => Cow::Borrowed(body),
    }
}

/// Map a tag kind to its block kind
pub fn kind_for(tag: TagName) -> BlockKind {
    match tag {
        TagName::ToolUse => BlockKind::ToolUse,
        TagName::ToolCall => BlockKind::ToolCall,
        TagName::Thinking | TagName::Thought => BlockKind::Thinking,
        TagName::Result => BlockKind::Result,
        TagName::FinalAnswer => BlockKind::FinalAnswer,
        TagName::Error => BlockKind::Error,
        TagName::Action => BlockKind::Action,
        TagName::ActionInput => BlockKind::ActionInput,
        TagName::Observation => BlockKind::Observation,
    }
}

/// Build the block for one tagged body (after `#text` unwrapping)
pub fn classify(tag: TagName, body: &str) -> BlockDraft {
    match tag {
        TagName::ToolCall => parse_tool_call(body),
        other => BlockDraft::new(kind_for(other), body),
    }
}

fn parse_tool_call(body: &str) -> BlockDraft {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    let reasoning = strip_inner(body, &TOOL_CALL_PARTS);
    let mut draft = BlockDraft::new(BlockKind::ToolCall, body);
    draft.tool_name = find_inner(body, "tool_name").and_then(non_empty);
    draft.arguments_text = find_inner(body, "args").and_then(non_empty);
    draft.tool_result_text = find_inner(body, "tool_result").and_then(non_empty);
    draft.reasoning_text = non_empty(reasoning.trim());

    tracing::debug!(
        tool_name = draft.tool_name.as_deref().unwrap_or("<none>"),
        has_args = draft.arguments_text.is_some(),
        has_result = draft.tool_result_text.is_some(),
        "Parsed tool_call block"
    );
    draft
}

/// Split a `tool_use` body into `action`, `action_input` and `observation`
pub fn decompose_tool_use(content: &str) -> ToolUseParts {
    let part = |name: &str| find_inner(content, name).map(str::to_string);
    ToolUseParts {
        action: part("action"),
        action_input: part("action_input"),
        observation: part("observation"),
    }
}

/// The field of a block that may hold tool output worth sniffing for charts
pub fn tool_output(draft: &BlockDraft) -> Option<Cow<'_, str>> {
    match draft.kind {
        BlockKind::Observation | BlockKind::Result => Some(Cow::Borrowed(draft.content.trim())),
        BlockKind::ToolCall => draft.tool_result_text.as_deref().map(Cow::Borrowed),
        BlockKind::ToolUse => decompose_tool_use(&draft.content)
            .observation
            .map(Cow::Owned),
        _ => None,
    }
}
