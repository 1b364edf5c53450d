use serde::{Deserialize, Serialize};
use std::fmt;

use super::chart::NormalizedChart;

/// Kind of a parsed content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    ToolCall,
    ToolUse,
    Thinking,
    Result,
    FinalAnswer,
    Error,
    Action,
    ActionInput,
    Observation,
    Chart,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::ToolCall => "tool_call",
            BlockKind::ToolUse => "tool_use",
            BlockKind::Thinking => "thinking",
            BlockKind::Result => "result",
            BlockKind::FinalAnswer => "final_answer",
            BlockKind::Error => "error",
            BlockKind::Action => "action",
            BlockKind::ActionInput => "action_input",
            BlockKind::Observation => "observation",
            BlockKind::Chart => "chart",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified unit of output, ready for the renderer.
///
/// Blocks are only created through [`crate::parser::BlockSequence`], which
/// assigns `position` at emission time. The tool fields are derived from the
/// block body and have no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    kind: BlockKind,
    content: String,
    position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
    #[serde(rename = "args", skip_serializing_if = "Option::is_none")]
    arguments_text: Option<String>,
    #[serde(rename = "tool_result", skip_serializing_if = "Option::is_none")]
    tool_result_text: Option<String>,
    #[serde(rename = "reasoning", skip_serializing_if = "Option::is_none")]
    reasoning_text: Option<String>,
}

impl ContentBlock {
    pub(crate) fn from_draft(draft: BlockDraft, position: usize) -> Self {
        Self {
            kind: draft.kind,
            content: draft.content,
            position,
            tool_name: draft.tool_name,
            arguments_text: draft.arguments_text,
            tool_result_text: draft.tool_result_text,
            reasoning_text: draft.reasoning_text,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    pub fn arguments_text(&self) -> Option<&str> {
        self.arguments_text.as_deref()
    }

    pub fn tool_result_text(&self) -> Option<&str> {
        self.tool_result_text.as_deref()
    }

    pub fn reasoning_text(&self) -> Option<&str> {
        self.reasoning_text.as_deref()
    }

    /// Second-pass decomposition of a `tool_use` body into its ReAct parts.
    ///
    /// Returns `None` for any other kind.
    pub fn tool_use_parts(&self) -> Option<ToolUseParts> {
        (self.kind == BlockKind::ToolUse)
            .then(|| crate::parser::classify::decompose_tool_use(&self.content))
    }

    /// Renderer-ready payload of a `chart` block
    pub fn normalized_chart(&self) -> Option<NormalizedChart> {
        if self.kind != BlockKind::Chart {
            return None;
        }
        crate::chart::normalize_json(&self.content)
    }
}

/// A block before it has been given its position
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDraft {
    pub kind: BlockKind,
    pub content: String,
    pub tool_name: Option<String>,
    pub arguments_text: Option<String>,
    pub tool_result_text: Option<String>,
    pub reasoning_text: Option<String>,
}

impl BlockDraft {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            tool_name: None,
            arguments_text: None,
            tool_result_text: None,
            reasoning_text: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Text, content)
    }

    pub fn chart(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Chart, content)
    }
}

/// Sub-bodies of a `tool_use` block; any missing inner tag is `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolUseParts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

impl ToolUseParts {
    pub fn is_empty(&self) -> bool {
        self.action.is_none() && self.action_input.is_none() && self.observation.is_none()
    }
}
