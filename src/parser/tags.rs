use regex::Regex;
use std::fmt;
use std::str::FromStr;

lazy_static::lazy_static! {
    /// Opening delimiter for any block-level tag in the vocabulary
    static ref OPEN_TAG: Regex = Regex::new(
        r"<(tool_use|tool_call|thinking|thought|result|final_answer|error|action_input|action|observation)>"
    )
    .expect("open tag pattern is valid");
}

/// Closed vocabulary of block-level tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagName {
    ToolUse,
    ToolCall,
    Thinking,
    Thought,
    Result,
    FinalAnswer,
    Error,
    Action,
    ActionInput,
    Observation,
}

impl TagName {
    pub const ALL: [TagName; 10] = [
        TagName::ToolUse,
        TagName::ToolCall,
        TagName::Thinking,
        TagName::Thought,
        TagName::Result,
        TagName::FinalAnswer,
        TagName::Error,
        TagName::Action,
        TagName::ActionInput,
        TagName::Observation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagName::ToolUse => "tool_use",
            TagName::ToolCall => "tool_call",
            TagName::Thinking => "thinking",
            TagName::Thought => "thought",
            TagName::Result => "result",
            TagName::FinalAnswer => "final_answer",
            TagName::Error => "error",
            TagName::Action => "action",
            TagName::ActionInput => "action_input",
            TagName::Observation => "observation",
        }
    }

    fn closing(&self) -> String {
        format!("</{}>", self.as_str())
    }
}

impl FromStr for TagName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagName::ALL.into_iter().find(|t| t.as_str() == s).ok_or(())
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run of the input: either plain text or one tag pair.
///
/// `start..end` is the byte range in the scanned input. For tagged segments
/// it covers both delimiters; `body` is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text {
        value: &'a str,
        start: usize,
        end: usize,
    },
    Tagged {
        tag: TagName,
        body: &'a str,
        start: usize,
        end: usize,
    },
}

impl Segment<'_> {
    pub fn range(&self) -> (usize, usize) {
        match self {
            Segment::Text { start, end, .. } | Segment::Tagged { start, end, .. } => (*start, *end),
        }
    }
}

/// Result of one segmentation pass
#[derive(Debug, Clone, Default)]
pub struct Segmentation<'a> {
    pub segments: Vec<Segment<'a>>,
    /// Open tags skipped because no matching close tag followed them
    pub unclosed_tags: usize,
}

/// Split `text` into ordered text and tagged segments
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    scan(text).segments
}

/// Left-to-right scan for non-overlapping tag pairs.
///
/// Each open tag closes at the first following close tag of the same name.
/// An open tag with no close is left in the text and the scan resumes one
/// byte past its `<`.
pub fn scan(text: &str) -> Segmentation<'_> {
    let mut out = Segmentation::default();
    let mut cursor = 0;
    let mut search = 0;

    while search < text.len() {
        let Some(open) = OPEN_TAG.find_at(text, search) else {
            break;
        };
        let Ok(tag) = open.as_str()[1..open.as_str().len() - 1].parse::<TagName>() else {
            search = open.start() + 1;
            continue;
        };

        let closing = tag.closing();
        let Some(rel) = text[open.end()..].find(&closing) else {
            tracing::debug!(tag = %tag, offset = open.start(), "No closing tag, leaving as text");
            out.unclosed_tags += 1;
            search = open.start() + 1;
            continue;
        };

        let close_start = open.end() + rel;
        let close_end = close_start + closing.len();

        push_text(&mut out.segments, text, cursor, open.start());

        let body = text[open.end()..close_start].trim();
        if body.is_empty() {
            tracing::debug!(tag = %tag, "Dropping empty tag body");
        } else {
            out.segments.push(Segment::Tagged {
                tag,
                body,
                start: open.start(),
                end: close_end,
            });
        }

        cursor = close_end;
        search = close_end;
    }

    push_text(&mut out.segments, text, cursor, text.len());
    out
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let value = text[start..end].trim();
    if !value.is_empty() {
        segments.push(Segment::Text { value, start, end });
    }
}

/// Body of the first `<name>...</name>` pair in `body`, trimmed
pub fn find_inner<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");

    let start = body.find(&open)? + open.len();
    let len = body[start..].find(&close)?;
    Some(body[start..start + len].trim())
}

/// Remove every `<name>...</name>` pair for each of `names`, in order
pub fn strip_inner(body: &str, names: &[&str]) -> String {
    names
        .iter()
        .fold(body.to_string(), |acc, name| remove_pairs(&acc, name))
}

fn remove_pairs(input: &str, name: &str) -> String {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    loop {
        let Some(start) = rest.find(&open) else {
            break;
        };
        let after_open = start + open.len();
        let Some(len) = rest[after_open..].find(&close) else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[after_open + len + close.len()..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged<'a>(seg: &Segment<'a>) -> Option<(TagName, &'a str)> {
        match seg {
            Segment::Tagged { tag, body, .. } => Some((*tag, *body)),
            Segment::Text { .. } => None,
        }
    }

    #[test]
    fn test_plain_text_only() {
        let segs = segment("  just words  ");
        assert_eq!(segs.len(), 1);
        assert!(matches!(segs[0], Segment::Text { value: "just words", .. }));
    }

    #[test]
    fn test_mixed_segments_in_order() {
        let input = "<thinking>Plan.</thinking>\n\nDo it.\n\n<final_answer>Done.</final_answer>";
        let segs = segment(input);

        assert_eq!(segs.len(), 3);
        assert_eq!(tagged(&segs[0]), Some((TagName::Thinking, "Plan.")));
        assert!(matches!(segs[1], Segment::Text { value: "Do it.", .. }));
        assert_eq!(tagged(&segs[2]), Some((TagName::FinalAnswer, "Done.")));
        assert_eq!(segs[2].range().1, input.len());
    }

    #[test]
    fn test_action_and_action_input_are_distinct() {
        let segs = segment("<action>search</action><action_input>{\"q\":1}</action_input>");
        assert_eq!(tagged(&segs[0]), Some((TagName::Action, "search")));
        assert_eq!(tagged(&segs[1]), Some((TagName::ActionInput, "{\"q\":1}")));
    }

    #[test]
    fn test_unclosed_tag_is_text() {
        let out = scan("<result>Unclosed");
        assert_eq!(out.unclosed_tags, 1);
        assert_eq!(out.segments.len(), 1);
        assert!(matches!(
            out.segments[0],
            Segment::Text {
                value: "<result>Unclosed",
                ..
            }
        ));
    }

    #[test]
    fn test_unclosed_tag_before_complete_tag() {
        let segs = segment("<thinking>half <result>ok</result> tail");
        assert_eq!(segs.len(), 3);
        assert!(matches!(segs[0], Segment::Text { value: "<thinking>half", .. }));
        assert_eq!(tagged(&segs[1]), Some((TagName::Result, "ok")));
        assert!(matches!(segs[2], Segment::Text { value: "tail", .. }));
    }

    #[test]
    fn test_mismatched_close_does_not_end_tag() {
        let segs = segment("<thinking>a</result> b</thinking>");
        assert_eq!(segs.len(), 1);
        assert_eq!(tagged(&segs[0]), Some((TagName::Thinking, "a</result> b")));
    }

    #[test]
    fn test_same_tag_nesting_closes_early() {
        let segs = segment("<thinking>outer <thinking>inner</thinking> rest</thinking>");
        assert_eq!(
            tagged(&segs[0]),
            Some((TagName::Thinking, "outer <thinking>inner"))
        );
        assert!(matches!(segs[1], Segment::Text { value: "rest</thinking>", .. }));
    }

    #[test]
    fn test_empty_body_dropped() {
        let segs = segment("a <error>  \n </error> b");
        assert_eq!(segs.len(), 2);
        assert!(segs.iter().all(|s| tagged(s).is_none()));
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let segs = segment("<Thinking>x</Thinking>");
        assert_eq!(segs.len(), 1);
        assert!(tagged(&segs[0]).is_none());
    }

    #[test]
    fn test_unknown_tags_stay_in_text() {
        let segs = segment("<tool_name>x</tool_name>");
        assert!(matches!(segs[0], Segment::Text { .. }));
    }

    #[test]
    fn test_find_inner() {
        let body = "<tool_name> load_csv </tool_name><args>{}</args>";
        assert_eq!(find_inner(body, "tool_name"), Some("load_csv"));
        assert_eq!(find_inner(body, "args"), Some("{}"));
        assert_eq!(find_inner(body, "tool_result"), None);
        assert_eq!(find_inner("<args>open", "args"), None);
    }

    #[test]
    fn test_strip_inner() {
        let body = "I will load.<tool_name>x</tool_name> <args>1</args><args>2</args> ok";
        let stripped = strip_inner(body, &["tool_name", "args", "tool_result"]);
        assert_eq!(stripped, "I will load.  ok");
    }

    #[test]
    fn test_multibyte_text_around_tags() {
        let segs = segment("héllo 🤔 <result>✓</result> fin");
        assert_eq!(segs.len(), 3);
        assert_eq!(tagged(&segs[1]), Some((TagName::Result, "✓")));
    }
}
