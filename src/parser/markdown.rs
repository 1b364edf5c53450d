//! Pre-rendered agent output: markdown step headings plus HTML `<details>`
//! tool panels instead of pseudo-XML tags.

use regex::Regex;

use super::tags::find_inner;
use crate::models::{BlockDraft, BlockKind};

lazy_static::lazy_static! {
    static ref THINKING_HEADER: Regex =
        Regex::new(r"## 🤔 Thinking \(Step \d+\)\n\n").expect("thinking header pattern is valid");
    static ref FINAL_HEADER: Regex =
        Regex::new(r"## 🎯 Final Answer\n\n").expect("final answer header pattern is valid");
    static ref TOOL_DETAILS: Regex = Regex::new(
        r"(?s)<details>\s*<summary>🔧 <strong>Tool: ([^<]+)</strong>[^<]*</summary>\s*(.*?)</details>"
    )
    .expect("tool details pattern is valid");
    static ref ARGUMENTS: Regex = Regex::new(r"(?s)\*\*Arguments:\*\*\s*```(?:json)?\s*(.*?)\s*```")
        .expect("arguments pattern is valid");
    static ref RESULT: Regex = Regex::new(r"(?s)\*\*Result:\*\*\s*```(?:json)?\s*(.*?)\s*```")
        .expect("result pattern is valid");
}

const THINKING_STOPS: [&str; 3] = ["\n## ", "<details>", "## 🎯"];
const FINAL_STOPS: [&str; 2] = ["\n## ", "<details>"];

/// A piece of rendered output, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum Piece<'a> {
    Text(&'a str),
    Block(BlockDraft),
}

struct Section {
    start: usize,
    end: usize,
    /// `None` for a heading with nothing under it yet
    draft: Option<BlockDraft>,
}

/// Does `text` look like the rendered format rather than tagged output?
pub fn is_rendered_format(text: &str) -> bool {
    text.contains("<details>")
        || text.contains("## 🤔 Thinking")
        || text.contains("## 🎯 Final Answer")
        || (text.contains("**Arguments:**") && text.contains("**Result:**"))
}

/// Split rendered output into text runs and section blocks.
///
/// Sections are taken in start order; one that overlaps an already
/// consumed section is skipped.
pub fn parse_rendered(text: &str) -> Vec<Piece<'_>> {
    let mut sections = Vec::new();
    collect_headed(text, &THINKING_HEADER, &THINKING_STOPS, BlockKind::Thinking, &mut sections);
    collect_headed(text, &FINAL_HEADER, &FINAL_STOPS, BlockKind::FinalAnswer, &mut sections);

    for caps in TOOL_DETAILS.captures_iter(text) {
        let (Some(whole), Some(name), Some(body)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        sections.push(Section {
            start: whole.start(),
            end: whole.end(),
            draft: Some(tool_details(body.as_str().trim(), name.as_str().trim())),
        });
    }

    sections.sort_by_key(|s| s.start);
    tracing::debug!(sections = sections.len(), "Parsed rendered agent sections");

    let mut pieces = Vec::with_capacity(sections.len() * 2 + 1);
    let mut cursor = 0;
    for section in sections {
        if section.start < cursor {
            continue;
        }
        push_text(&mut pieces, &text[cursor..section.start]);
        if let Some(draft) = section.draft {
            pieces.push(Piece::Block(draft));
        }
        cursor = section.end;
    }
    push_text(&mut pieces, &text[cursor..]);

    pieces
}

fn push_text<'a>(pieces: &mut Vec<Piece<'a>>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }
}

fn collect_headed(
    text: &str,
    header: &Regex,
    stops: &[&str],
    kind: BlockKind,
    out: &mut Vec<Section>,
) {
    for m in header.find_iter(text) {
        let rest = &text[m.end()..];
        // The header eats its blank line, so a heading straight after it
        // starts at offset 0 where "\n## " cannot match.
        let len = if rest.starts_with("## ") {
            0
        } else {
            stops
                .iter()
                .filter_map(|stop| rest.find(stop))
                .min()
                .unwrap_or(rest.len())
        };
        let body = rest[..len].trim();
        out.push(Section {
            start: m.start(),
            end: m.end() + len,
            draft: (!body.is_empty()).then(|| BlockDraft::new(kind, body)),
        });
    }
}

fn tool_details(content: &str, name: &str) -> BlockDraft {
    let capture = |re: &Regex| {
        re.captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let mut draft = BlockDraft::new(BlockKind::ToolUse, content);
    draft.tool_name = Some(if name.is_empty() { "Unknown Tool" } else { name }.to_string());
    draft.arguments_text = capture(&ARGUMENTS);
    draft.tool_result_text = capture(&RESULT);
    if draft.tool_result_text.is_none() {
        draft.tool_result_text = find_inner(content, "observation").map(str::to_string);
    }
    draft
}
