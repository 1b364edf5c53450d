use regex::Regex;
use serde_json::Value;

use super::detect::{is_known_chart_envelope, parse_json, route_for};
use crate::models::{BlockDraft, ChartRoute};

lazy_static::lazy_static! {
    /// Opening code fence with an optional chart-ish language hint
    static ref FENCE_OPEN: Regex = Regex::new(
        r"(?i)```(?:json|plotly|chart|recharts|visualization)?"
    )
    .expect("fence pattern is valid");

    /// Natural-language label introducing a chart object
    static ref CHART_LABEL: Regex = Regex::new(
        r"(?i)(?:chart data|visualization|plot data|figure):\s*"
    )
    .expect("chart label pattern is valid");
}

/// Where in the span a chart was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Fenced,
    WholeSpan,
    InlineLine,
    Labelled,
}

/// A chart object located inside a text span
#[derive(Debug, Clone, PartialEq)]
pub struct ChartMatch {
    /// Raw JSON text of the chart, without fences or label
    pub json: String,
    pub value: Value,
    /// Byte range removed from the span, delimiters included
    pub start: usize,
    pub end: usize,
    pub source: MatchSource,
}

impl ChartMatch {
    fn new(json: &str, value: Value, start: usize, end: usize, source: MatchSource) -> Self {
        Self {
            json: json.trim().to_string(),
            value,
            start,
            end,
            source,
        }
    }

    /// The span with the matched range cut out, trimmed
    pub fn residual(&self, span: &str) -> String {
        let mut out = String::with_capacity(span.len());
        out.push_str(&span[..self.start]);
        out.push_str(&span[self.end..]);
        out.trim().to_string()
    }

    pub fn route(&self) -> ChartRoute {
        route_for(&self.value)
    }
}

/// Find at most one chart in `span`.
///
/// Fenced blocks are tried first, then the whole span as one document,
/// then single-line objects, then labelled objects. Within each pass the
/// first candidate in document order that is a known chart envelope wins.
pub fn sniff(span: &str) -> Option<ChartMatch> {
    find_fenced(span)
        .or_else(|| find_whole(span))
        .or_else(|| find_inline_line(span))
        .or_else(|| find_labelled(span))
        .inspect(|m| {
            tracing::debug!(
                source = ?m.source,
                route = ?m.route(),
                start = m.start,
                end = m.end,
                "Chart found in text span"
            );
        })
}

fn accept(candidate: &str) -> Option<Value> {
    parse_json(candidate).filter(is_known_chart_envelope)
}

fn find_fenced(span: &str) -> Option<ChartMatch> {
    const FENCE: &str = "```";

    // Each opening fence pairs with its own closing fence, so a rejected
    // block never bleeds into the next one.
    let mut from = 0;
    while let Some(open) = FENCE_OPEN.find_at(span, from) {
        let close = open.end() + span[open.end()..].find(FENCE)?;
        let end = close + FENCE.len();
        let body = span[open.end()..close].trim();

        if body.starts_with('{')
            && body.ends_with('}')
            && let Some(value) = accept(body)
        {
            return Some(ChartMatch::new(body, value, open.start(), end, MatchSource::Fenced));
        }
        from = end;
    }
    None
}

fn find_whole(span: &str) -> Option<ChartMatch> {
    let trimmed = span.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let start = span.len() - span.trim_start().len();
    let value = accept(trimmed)?;
    Some(ChartMatch::new(
        trimmed,
        value,
        start,
        start + trimmed.len(),
        MatchSource::WholeSpan,
    ))
}

fn find_inline_line(span: &str) -> Option<ChartMatch> {
    let mut offset = 0;
    for line in span.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let trimmed = line.trim();
        if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
            continue;
        }
        if let Some(value) = accept(trimmed) {
            return Some(ChartMatch::new(
                trimmed,
                value,
                start,
                offset,
                MatchSource::InlineLine,
            ));
        }
    }
    None
}

fn find_labelled(span: &str) -> Option<ChartMatch> {
    CHART_LABEL.find_iter(span).find_map(|label| {
        let rest = &span[label.end()..];
        if !rest.starts_with('{') {
            return None;
        }
        let len = json_object_end(rest.as_bytes())?;
        let value = accept(&rest[..len])?;
        Some(ChartMatch::new(
            &rest[..len],
            value,
            label.start(),
            label.end() + len,
            MatchSource::Labelled,
        ))
    })
}

/// Length of the balanced JSON object at the start of `bytes`
pub fn json_object_end(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else {
                match byte {
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            }
        }
    }

    None
}

/// Turn one text span into text and chart drafts in emission order.
///
/// The chart goes first when only whitespace precedes it in the span,
/// otherwise after the residual text.
pub fn split_span(span: &str) -> Vec<BlockDraft> {
    let Some(found) = sniff(span) else {
        let text = span.trim();
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![BlockDraft::text(text)]
        };
    };

    let residual = found.residual(span);
    let chart_leads = span[..found.start].trim().is_empty();
    let chart = BlockDraft::chart(found.json);

    let mut drafts = Vec::with_capacity(2);
    if chart_leads {
        drafts.push(chart);
        if !residual.is_empty() {
            drafts.push(BlockDraft::text(residual));
        }
    } else {
        if !residual.is_empty() {
            drafts.push(BlockDraft::text(residual));
        }
        drafts.push(chart);
    }
    drafts
}
