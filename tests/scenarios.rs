use agent_stream_parser::{
    BlockKind, ChartRoute, NormalizedChart, StreamAssembler,
    chart::{is_chart_data, is_known_chart_envelope, route_for},
    parse_structured_content,
};
use serde_json::Value;

/// Thinking, prose and final answer come out in document order
#[test]
fn test_thinking_text_final_answer() {
    let blocks = parse_structured_content(
        "<thinking>Plan.</thinking>\n\nDo it.\n\n<final_answer>Done.</final_answer>",
    );

    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].kind(), BlockKind::Thinking);
    assert_eq!(blocks[0].content(), "Plan.");
    assert_eq!(blocks[1].kind(), BlockKind::Text);
    assert_eq!(blocks[1].content(), "Do it.");
    assert_eq!(blocks[2].kind(), BlockKind::FinalAnswer);
    assert_eq!(blocks[2].content(), "Done.");

    let positions: Vec<usize> = blocks.iter().map(|b| b.position()).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

/// A fenced bar chart is pulled out of the prose around it
#[test]
fn test_fenced_chart_in_prose() {
    let text = "Sales by region:\n```json\n{\"type\":\"bar\",\"data\":[{\"label\":\"A\",\"value\":1}]}\n```\nRegion A leads.";
    let blocks = parse_structured_content(text);

    assert_eq!(blocks.len(), 2);
    let text_block = blocks.iter().find(|b| b.kind() == BlockKind::Text).unwrap();
    assert!(text_block.content().contains("Sales by region:"));
    assert!(text_block.content().contains("Region A leads."));
    assert!(!text_block.content().contains("```"));

    let chart = blocks.iter().find(|b| b.kind() == BlockKind::Chart).unwrap();
    let value: Value = serde_json::from_str(chart.content()).unwrap();
    assert_eq!(value["type"], "bar");
    assert_eq!(route_for(&value), ChartRoute::Categorical);

    match chart.normalized_chart().unwrap() {
        NormalizedChart::Categorical { chart_type, data, .. } => {
            assert_eq!(chart_type, "bar");
            assert_eq!(data.len(), 1);
        }
        other => panic!("expected categorical chart, got {other:?}"),
    }
}

/// A bare heatmap object is a chart routed to the matrix renderer
#[test]
fn test_bare_heatmap_routes_to_matrix() {
    let text = r#"{"type":"heatmap","x":["A"],"y":["1"],"z":[[0.5]]}"#;
    assert!(is_chart_data(text));

    let value: Value = serde_json::from_str(text).unwrap();
    assert!(is_known_chart_envelope(&value));
    assert_eq!(route_for(&value), ChartRoute::Matrix);

    let blocks = parse_structured_content(text);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind(), BlockKind::Chart);

    let normalized = blocks[0].normalized_chart().unwrap();
    assert_eq!(normalized.route(), ChartRoute::Matrix);
    match normalized {
        NormalizedChart::Matrix { plotly_data, .. } => {
            assert_eq!(plotly_data[0]["type"], "heatmap");
            assert_eq!(plotly_data[0]["z"][0][0], 0.5);
        }
        other => panic!("expected matrix chart, got {other:?}"),
    }
}

/// tool_call sub-fields are extracted and missing ones stay absent
#[test]
fn test_tool_call_without_result() {
    let blocks = parse_structured_content(
        r#"<tool_call><tool_name>load_csv</tool_name><args>{"path":"a.csv"}</args></tool_call>"#,
    );

    assert_eq!(blocks.len(), 1);
    let block = &blocks[0];
    assert_eq!(block.kind(), BlockKind::ToolCall);
    assert_eq!(block.tool_name(), Some("load_csv"));
    assert_eq!(block.arguments_text(), Some(r#"{"path":"a.csv"}"#));
    assert_eq!(block.tool_result_text(), None);
    assert_eq!(block.reasoning_text(), None);
}

/// A line split across two chunks is reassembled
#[test]
fn test_assembler_rejoins_split_line() {
    let mut assembler = StreamAssembler::new();

    let first = assembler.process_str("{\"type\":\"a\"}\n{\"type\":\"b\"");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].kind, "a");

    let second = assembler.process_str("}\n");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].kind, "b");

    assert!(assembler.flush().is_empty());
}

/// An unclosed tag degrades to plain text
#[test]
fn test_unclosed_tag_is_text() {
    let blocks = parse_structured_content("<result>Unclosed");

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind(), BlockKind::Text);
    assert_eq!(blocks[0].content(), "<result>Unclosed");
    assert!(blocks.iter().all(|b| b.kind() != BlockKind::Result));
}

/// A rendered heading with no body yet produces no block
#[test]
fn test_empty_rendered_heading_is_dropped() {
    let blocks = parse_structured_content("Working...\n\n## 🎯 Final Answer\n\n");

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind(), BlockKind::Text);
    assert_eq!(blocks[0].content(), "Working...");
    assert!(blocks.iter().all(|b| !b.content().is_empty()));
}
