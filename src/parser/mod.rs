//! Text to ordered block list.
//!
//! The pipeline is: segment the text on the tag vocabulary, classify each
//! tagged body, sniff text runs and tool output for chart JSON, and emit
//! everything through one [`BlockSequence`] so positions follow emission.

pub mod blocks;
pub mod classify;
pub mod markdown;
pub mod tags;

pub use blocks::BlockSequence;
pub use tags::{Segment, TagName, segment};

use std::time::Instant;

use crate::chart;
use crate::config::ParseOptions;
use crate::metrics::PARSE_METRICS;
use crate::models::{BlockDraft, BlockKind, ContentBlock, ToolExecution};

/// Stateless structured-content parser; safe to share across threads
#[derive(Debug, Clone, Default)]
pub struct StructuredParser {
    options: ParseOptions,
}

impl StructuredParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse one message into an ordered block list. Never fails.
    pub fn parse(&self, text: &str) -> Vec<ContentBlock> {
        let started = Instant::now();
        let mut seq = BlockSequence::new();
        let mut unclosed = 0;

        if self.options.rendered_format && markdown::is_rendered_format(text) {
            for piece in markdown::parse_rendered(text) {
                match piece {
                    markdown::Piece::Text(t) => self.emit_text(&mut seq, t),
                    markdown::Piece::Block(draft) => self.emit_block(&mut seq, draft),
                }
            }
        } else {
            let scan = tags::scan(text);
            unclosed = scan.unclosed_tags;

            for segment in scan.segments {
                match segment {
                    Segment::Text { value, .. } => self.emit_text(&mut seq, value),
                    Segment::Tagged { tag, body, .. } => {
                        let body = classify::unwrap_text_envelope(body);
                        let body = body.trim();
                        if body.is_empty() {
                            continue;
                        }
                        self.emit_block(&mut seq, classify::classify(tag, body));
                    }
                }
            }
        }

        PARSE_METRICS.record_parse(
            seq.len(),
            seq.count_kind(BlockKind::Chart),
            unclosed,
            started.elapsed(),
        );
        tracing::debug!(
            blocks = seq.len(),
            unclosed_tags = unclosed,
            "Parsed structured content"
        );

        seq.into_blocks()
    }

    /// Parse, then append chart blocks for chart-shaped tool responses
    pub fn parse_with_executions(
        &self,
        text: &str,
        executions: &[ToolExecution],
    ) -> Vec<ContentBlock> {
        let mut seq = BlockSequence::continuing(self.parse(text));

        for (i, execution) in executions.iter().enumerate() {
            let Some(response) = execution.response_text() else {
                continue;
            };
            if !chart::is_chart_data(&response) {
                continue;
            }

            let tool = execution.tool_name.as_deref().unwrap_or("unknown tool");
            let mut draft = BlockDraft::chart(response.trim());
            draft.tool_name = execution.tool_name.clone();
            draft.reasoning_text = Some(format!(
                "Chart generated from {} (execution #{})",
                tool,
                i + 1
            ));
            tracing::debug!(tool, execution = i + 1, "Chart found in tool execution");
            seq.push(draft);
        }

        seq.into_blocks()
    }

    fn emit_text(&self, seq: &mut BlockSequence, text: &str) {
        if self.options.detect_charts {
            for draft in chart::split_span(text) {
                seq.push(draft);
            }
        } else {
            seq.push_text(text);
        }
    }

    fn emit_block(&self, seq: &mut BlockSequence, draft: BlockDraft) {
        let chart = if self.options.scan_tool_output {
            classify::tool_output(&draft)
                .filter(|output| chart::is_chart_data(output))
                .map(|output| output.into_owned())
        } else {
            None
        };

        seq.push(draft);
        if let Some(json) = chart {
            seq.push(BlockDraft::chart(json));
        }
    }
}

/// Parse with default options
pub fn parse_structured_content(text: &str) -> Vec<ContentBlock> {
    StructuredParser::default().parse(text)
}
