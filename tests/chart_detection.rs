use agent_stream_parser::{
    BlockKind, ChartRoute, NormalizedChart, StructuredParser, ToolExecution,
    chart::{
        ChartShape, MatchSource, bucket_values, detect_shape, is_chart_data,
        is_known_chart_envelope, normalize, sniff,
    },
    parse_structured_content,
};
use serde_json::{Value, json};

#[test]
fn test_loose_detection_table() {
    assert!(is_chart_data(r#"{"type":"anything"}"#));
    assert!(is_chart_data(r#"{"data":[]}"#));
    assert!(is_chart_data(r#"{"series":[]}"#));
    assert!(is_chart_data(r#"{"x":[1],"y":[2]}"#));
    assert!(is_chart_data(r#"{"labels":["a"]}"#));
    assert!(is_chart_data(r#"{"datasets":[]}"#));
    assert!(is_chart_data(r#"{"bars":{}}"#));
    assert!(is_chart_data(r#"{"points":[]}"#));

    assert!(!is_chart_data(r#"{"type":""}"#));
    assert!(!is_chart_data(r#"{"data":null}"#));
    assert!(!is_chart_data(r#"{"x":[1],"y":0}"#));
    assert!(!is_chart_data(r#"{"name":"table"}"#));
    assert!(!is_chart_data("[1, 2, 3]"));
    assert!(!is_chart_data("null"));
    assert!(!is_chart_data("not json at all"));
}

#[test]
fn test_detection_is_idempotent() {
    let candidate = r#"{"type":"line","points":[{"x":1,"y":2}]}"#;
    let before = candidate.to_string();
    assert_eq!(is_chart_data(candidate), is_chart_data(candidate));
    assert_eq!(candidate, before);
}

#[test]
fn test_shape_order() {
    assert_eq!(
        detect_shape(&json!({"type": "bar", "data": []})),
        Some(ChartShape::Typed)
    );
    assert_eq!(
        detect_shape(&json!({"type": "", "data": []})),
        Some(ChartShape::Data)
    );
    assert_eq!(detect_shape(&json!({"points": []})), Some(ChartShape::Points));
    assert_eq!(detect_shape(&json!({"foo": 1})), None);
}

#[test]
fn test_known_envelope_requires_type_and_payload() {
    assert!(is_known_chart_envelope(&json!({"type": "pie", "slices": []})));
    assert!(is_known_chart_envelope(&json!({"type": "scatter", "x": [], "y": []})));
    assert!(is_known_chart_envelope(&json!({"type": "heatmap", "z": []})));

    assert!(!is_known_chart_envelope(&json!({"type": "gauge", "data": []})));
    assert!(!is_known_chart_envelope(&json!({"type": "bar"})));
    assert!(!is_known_chart_envelope(&json!({"type": "line", "x": []})));
    assert!(!is_known_chart_envelope(&json!({"data": []})));
}

#[test]
fn test_first_fenced_chart_wins() {
    let span = "```json\n{\"not\":\"a chart\"}\n```\n\
```plotly\n{\"type\":\"boxplot\",\"data\":{}}\n```\n\
```chart\n{\"type\":\"bar\",\"data\":[]}\n```";

    let found = sniff(span).unwrap();
    assert_eq!(found.source, MatchSource::Fenced);
    assert_eq!(found.value["type"], "boxplot");
    assert_eq!(found.route(), ChartRoute::Matrix);
}

#[test]
fn test_inline_and_labelled_candidates() {
    let inline = "Result below\n  {\"type\":\"line\",\"data\":[1,2,3]}  \nend";
    let found = sniff(inline).unwrap();
    assert_eq!(found.source, MatchSource::InlineLine);
    assert_eq!(found.json, r#"{"type":"line","data":[1,2,3]}"#);

    let labelled = r#"Here it is. Chart data: {"type":"pie","data":[{"label":"a","value":{"n":1}}]} thanks"#;
    let found = sniff(labelled).unwrap();
    assert_eq!(found.source, MatchSource::Labelled);
    assert_eq!(found.value["data"][0]["value"]["n"], 1);
    assert_eq!(found.residual(labelled), "Here it is.  thanks");
}

#[test]
fn test_unknown_type_is_not_split_from_text() {
    let blocks = parse_structured_content(r#"{"type":"gauge","data":[1]}"#);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind(), BlockKind::Text);
}

#[test]
fn test_result_chart_is_emitted_after_result() {
    let blocks = parse_structured_content(
        "Running.\n<result>{\"type\":\"histogram\",\"data\":[1,2,15]}</result>\nDone.",
    );
    let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Text,
            BlockKind::Result,
            BlockKind::Chart,
            BlockKind::Text
        ]
    );
    assert_eq!(blocks[1].content(), blocks[2].content());
}

#[test]
fn test_histogram_bucketing() {
    let buckets = bucket_values(&[json!(3), json!(7.5), json!(25), json!("north"), json!("12")]);
    assert_eq!(
        buckets,
        vec![
            ("3-4".to_string(), 1),
            ("7-8".to_string(), 1),
            ("24-26".to_string(), 1),
            ("north".to_string(), 1),
            ("12-13".to_string(), 1),
        ]
    );

    let repeated = bucket_values(&[json!(1), json!(1.4), json!(2)]);
    assert_eq!(repeated, vec![("1-2".to_string(), 2), ("2-3".to_string(), 1)]);
}

#[test]
fn test_normalized_histogram_keeps_type() {
    let normalized = normalize(&json!({
        "type": "histogram",
        "column": "age",
        "bins": [{"range": [0, 10], "count": 4}, {"range": [10, 20], "count": 2}]
    }));

    match normalized {
        NormalizedChart::Categorical {
            chart_type,
            title,
            data,
            ..
        } => {
            assert_eq!(chart_type, "histogram");
            assert_eq!(title.as_deref(), Some("Distribution of age"));
            assert_eq!(data[0], json!({"label": "0.0-10.0", "value": 4}));
            assert_eq!(data[1], json!({"label": "10.0-20.0", "value": 2}));
        }
        other => panic!("expected categorical chart, got {other:?}"),
    }
}

#[test]
fn test_boxplot_builds_traces() {
    let normalized = normalize(&json!({
        "type": "boxplot",
        "columns": ["a", "b"],
        "data": {"a": [1, 2, 3], "b": [4, 5]}
    }));

    assert_eq!(normalized.route(), ChartRoute::Matrix);
    let value = serde_json::to_value(&normalized).unwrap();
    assert_eq!(value["type"], "boxplot");
    assert_eq!(value["plotly_data"].as_array().unwrap().len(), 2);
    assert_eq!(value["plotly_data"][0]["type"], "box");
}

#[test]
fn test_execution_records_add_charts() {
    let executions: Vec<ToolExecution> = serde_json::from_value(json!([
        {"tool_name": "describe", "tool_response": "rows: 10"},
        {"tool_name": "plot_sales", "response": "{\"type\":\"bar\",\"data\":[]}"},
        {"tool_name": "plot_ages", "tool_response": {"labels": ["a"], "datasets": []}},
        {"tool_name": "noop"}
    ]))
    .unwrap();

    let blocks = StructuredParser::new()
        .parse_with_executions("<thinking>Plotting.</thinking>", &executions);

    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1].kind(), BlockKind::Chart);
    assert_eq!(blocks[1].tool_name(), Some("plot_sales"));
    assert_eq!(
        blocks[1].reasoning_text(),
        Some("Chart generated from plot_sales (execution #2)")
    );
    assert_eq!(
        blocks[2].reasoning_text(),
        Some("Chart generated from plot_ages (execution #3)")
    );
    let value: Value = serde_json::from_str(blocks[2].content()).unwrap();
    assert_eq!(value["labels"][0], "a");
}

#[test]
fn test_commented_fence_before_chart_fence() {
    let text = "Intro\n```json\n{\"a\":1}\n// note\n```\nprose\n\
```json\n{\"type\":\"bar\",\"data\":[{\"label\":\"A\",\"value\":1}]}\n```\nend";
    let blocks = parse_structured_content(text);

    let kinds: Vec<_> = blocks.iter().map(|b| b.kind()).collect();
    assert_eq!(kinds, vec![BlockKind::Text, BlockKind::Chart]);
    assert_eq!(
        blocks[0].content(),
        "Intro\n```json\n{\"a\":1}\n// note\n```\nprose\n\nend"
    );
    assert_eq!(blocks[1].content(), r#"{"type":"bar","data":[{"label":"A","value":1}]}"#);
    assert!(blocks.iter().all(|b| !b.content().contains("```json\n```")));
}
