use serde_json::{Map, Value};

use crate::models::{ChartRoute, ChartType};

/// Which field made a JSON object look like chart data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartShape {
    Typed,
    Data,
    Series,
    XY,
    Labels,
    Datasets,
    Bars,
    Points,
}

#[derive(Debug, Clone, Copy)]
enum Predicate {
    Truthy(&'static str),
    BothTruthy(&'static str, &'static str),
}

impl Predicate {
    fn holds(&self, obj: &Map<String, Value>) -> bool {
        let truthy = |key: &str| obj.get(key).is_some_and(is_truthy);
        match self {
            Predicate::Truthy(key) => truthy(key),
            Predicate::BothTruthy(a, b) => truthy(a) && truthy(b),
        }
    }
}

/// Loose chart detection rules, checked in order; the first match wins.
const SHAPE_RULES: [(Predicate, ChartShape); 8] = [
    (Predicate::Truthy("type"), ChartShape::Typed),
    (Predicate::Truthy("data"), ChartShape::Data),
    (Predicate::Truthy("series"), ChartShape::Series),
    (Predicate::BothTruthy("x", "y"), ChartShape::XY),
    (Predicate::Truthy("labels"), ChartShape::Labels),
    (Predicate::Truthy("datasets"), ChartShape::Datasets),
    (Predicate::Truthy("bars"), ChartShape::Bars),
    (Predicate::Truthy("points"), ChartShape::Points),
];

/// Payload fields accepted by the strict envelope check
const PAYLOAD_FIELDS: [&str; 5] = ["data", "points", "bars", "slices", "bins"];

/// JavaScript-style truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strict JSON parse; `None` on any error
pub fn parse_json(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate.trim()).ok()
}

/// First rule of the decision table matched by `value`
pub fn detect_shape(value: &Value) -> Option<ChartShape> {
    let obj = value.as_object()?;
    SHAPE_RULES
        .iter()
        .find(|(predicate, _)| predicate.holds(obj))
        .map(|(_, shape)| *shape)
}

/// Does `candidate` parse as JSON that looks like chart data?
pub fn is_chart_data(candidate: &str) -> bool {
    parse_json(candidate)
        .as_ref()
        .and_then(detect_shape)
        .is_some()
}

/// Chart type of a payload, when it is one of the known types
pub fn chart_type_of(value: &Value) -> Option<ChartType> {
    value.get("type")?.as_str()?.parse().ok()
}

/// Known `type` plus a recognised payload field
pub fn is_known_chart_envelope(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if chart_type_of(value).is_none() {
        return false;
    }

    PAYLOAD_FIELDS.iter().any(|f| obj.contains_key(*f))
        || (obj.contains_key("x") && obj.contains_key("y"))
        || obj.contains_key("z")
}

/// Renderer for a payload; unrecognised types go to the series renderer
pub fn route_for(value: &Value) -> ChartRoute {
    chart_type_of(value)
        .map(|t| t.route())
        .unwrap_or(ChartRoute::Categorical)
}
