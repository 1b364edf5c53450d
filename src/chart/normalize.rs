use serde_json::{Map, Value, json};
use std::collections::HashMap;

use super::detect::{chart_type_of, is_truthy};
use crate::models::{ChartType, NormalizedChart};

/// Payload field names, in lookup order
const PAYLOAD_KEYS: [&str; 6] = ["data", "points", "bins", "bars", "slices", "series"];

/// Coerce a chart payload to the shape its renderer expects
pub fn normalize(value: &Value) -> NormalizedChart {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    match chart_type_of(value) {
        Some(ChartType::Heatmap) => heatmap(obj),
        Some(ChartType::Boxplot) => boxplot(obj),
        Some(ChartType::Histogram) => histogram(obj),
        Some(ChartType::Line) => line(obj),
        Some(ChartType::Scatter) => scatter(obj),
        Some(ChartType::StackedBar) => stacked_bar(obj),
        Some(t @ (ChartType::Bar | ChartType::Pie)) => passthrough(obj, t.as_str()),
        None => {
            let name = obj.get("type").and_then(Value::as_str).unwrap_or("unknown");
            passthrough(obj, name)
        }
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).filter(|v| is_truthy(v)).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn payload(obj: &Map<String, Value>) -> Vec<Value> {
    match PAYLOAD_KEYS
        .iter()
        .find_map(|k| obj.get(*k).filter(|v| is_truthy(v)))
    {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn number_value(f: Option<f64>) -> Value {
    f.and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

fn categorical(
    chart_type: &str,
    title: Option<String>,
    x_label: Option<String>,
    y_label: Option<String>,
    data: Vec<Value>,
) -> NormalizedChart {
    NormalizedChart::Categorical {
        chart_type: chart_type.to_string(),
        title,
        x_label,
        y_label,
        data,
        y_cols: None,
    }
}

fn passthrough(obj: &Map<String, Value>, chart_type: &str) -> NormalizedChart {
    categorical(
        chart_type,
        str_field(obj, "title"),
        str_field(obj, "x_label"),
        str_field(obj, "y_label"),
        payload(obj),
    )
}

/// Frequency buckets for raw histogram values.
///
/// Numbers land in `start-end` buckets of width `max(1, floor(|v| / 10))`;
/// strings that are not numbers count as their own category; anything else
/// counts as zero. Buckets keep first-seen order.
pub fn bucket_values(values: &[Value]) -> Vec<(String, u64)> {
    let mut order: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in values {
        let key = match value {
            Value::String(s) => match number_of(value) {
                Some(n) => bucket_key(n),
                None => s.clone(),
            },
            Value::Number(_) => bucket_key(number_of(value).unwrap_or(0.0)),
            _ => bucket_key(0.0),
        };

        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }

    order
}

fn bucket_key(value: f64) -> String {
    let width = (value.abs() / 10.0).floor().max(1.0);
    let start = (value / width).floor() * width;
    format!("{}-{}", format_number(start), format_number(start + width))
}

fn histogram(obj: &Map<String, Value>) -> NormalizedChart {
    let values = payload(obj);
    let column = str_field(obj, "column");
    let title = str_field(obj, "title").or_else(|| column.as_ref().map(|c| format!("Distribution of {c}")));
    let x_label = column.clone().or_else(|| Some("Value Range".to_string()));
    let y_label = Some("Frequency".to_string());

    let is_binned = values
        .first()
        .is_some_and(|b| b.get("range").is_some_and(is_truthy) && b.get("count").is_some());

    let data = if is_binned {
        values
            .iter()
            .map(|bin| {
                let bound = |i: usize| {
                    bin.get("range")
                        .and_then(|r| r.get(i))
                        .and_then(number_of)
                        .unwrap_or(0.0)
                };
                json!({
                    "label": format!("{:.1}-{:.1}", bound(0), bound(1)),
                    "value": bin.get("count").cloned().unwrap_or(Value::Null),
                })
            })
            .collect()
    } else {
        bucket_values(&values)
            .into_iter()
            .map(|(label, count)| json!({"label": label, "value": count}))
            .collect()
    };

    categorical("histogram", title, x_label, y_label, data)
}

fn is_point(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.contains_key("x") && o.contains_key("y"))
}

fn point(p: &Value, x: Value) -> Value {
    let y = p.get("y").cloned().unwrap_or(Value::Null);
    let label = format!(
        "{}: {}",
        display(p.get("x").unwrap_or(&Value::Null)),
        display(&y)
    );
    let y = match &y {
        Value::String(_) => number_value(number_of(&y)),
        _ => y,
    };
    json!({"x": x, "y": y, "label": label})
}

fn line(obj: &Map<String, Value>) -> NormalizedChart {
    let values = payload(obj);
    let column = str_field(obj, "column");

    if values.first().is_some_and(is_point) {
        let data = values
            .iter()
            .map(|p| point(p, p.get("x").cloned().unwrap_or(Value::Null)))
            .collect();
        return categorical(
            "line",
            str_field(obj, "title").or_else(|| Some("Line Chart".to_string())),
            str_field(obj, "x_label").or_else(|| Some("X".to_string())),
            str_field(obj, "y_label").or_else(|| Some("Y".to_string())),
            data,
        );
    }

    let data = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let y = number_of(v).filter(|f| *f != 0.0 || v.is_number()).unwrap_or(i as f64);
            json!({"x": i + 1, "y": number_value(Some(y)), "label": v})
        })
        .collect();
    categorical(
        "line",
        str_field(obj, "title").or_else(|| column.as_ref().map(|c| format!("{c} Over Time"))),
        Some("Index".to_string()),
        column.or_else(|| Some("Value".to_string())),
        data,
    )
}

fn scatter(obj: &Map<String, Value>) -> NormalizedChart {
    let values = payload(obj);
    if !values.first().is_some_and(is_point) {
        return passthrough(obj, "scatter");
    }

    let data = values
        .iter()
        .map(|p| {
            let raw_x = p.get("x").cloned().unwrap_or(Value::Null);
            let x = match &raw_x {
                Value::String(_) => number_of(&raw_x)
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(raw_x),
                _ => raw_x,
            };
            point(p, x)
        })
        .collect();

    let x_name = str_field(obj, "x");
    let y_name = str_field(obj, "y");
    let title = str_field(obj, "title").or_else(|| match (&y_name, &x_name) {
        (Some(y), Some(x)) => Some(format!("{y} vs {x}")),
        _ => None,
    });
    categorical(
        "scatter",
        title,
        x_name.or_else(|| Some("X".to_string())),
        y_name.or_else(|| Some("Y".to_string())),
        data,
    )
}

fn stacked_bar(obj: &Map<String, Value>) -> NormalizedChart {
    let (Some(bars), Some(xs), Some(cols)) = (
        obj.get("bars").and_then(Value::as_object),
        obj.get("x").and_then(Value::as_array),
        obj.get("y_cols").and_then(Value::as_array),
    ) else {
        return passthrough(obj, "stacked_bar");
    };

    let cols: Vec<String> = cols.iter().map(display).collect();
    let data = xs
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let mut row = Map::new();
            row.insert("x".to_string(), x.clone());
            for col in &cols {
                let v = bars
                    .get(col)
                    .and_then(|series| series.get(i))
                    .filter(|v| is_truthy(v))
                    .cloned()
                    .unwrap_or(json!(0));
                row.insert(col.clone(), v);
            }
            Value::Object(row)
        })
        .collect();

    NormalizedChart::Categorical {
        chart_type: "stacked_bar".to_string(),
        title: str_field(obj, "title").or_else(|| Some("Stacked Bar Chart".to_string())),
        x_label: str_field(obj, "x_label").or_else(|| Some("Category".to_string())),
        y_label: str_field(obj, "y_label").or_else(|| Some("Value".to_string())),
        data,
        y_cols: Some(cols),
    }
}

fn matrix(chart_type: &str, plotly_data: Value, plotly_layout: Value) -> NormalizedChart {
    NormalizedChart::Matrix {
        chart_type: chart_type.to_string(),
        plotly_data,
        plotly_layout,
    }
}

fn axis_title(obj: &Map<String, Value>, key: &str, default: &str) -> Value {
    json!({
        "title": str_field(obj, key).unwrap_or_else(|| default.to_string()),
        "automargin": true,
    })
}

fn heatmap(obj: &Map<String, Value>) -> NormalizedChart {
    let (Some(x), Some(y), Some(z)) = (
        obj.get("x").filter(|v| is_truthy(v)),
        obj.get("y").filter(|v| is_truthy(v)),
        obj.get("z").filter(|v| is_truthy(v)),
    ) else {
        return matrix("heatmap", json!([]), json!({}));
    };

    let cells: Vec<f64> = z
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|row| row.as_array().into_iter().flatten())
        .filter_map(Value::as_f64)
        .collect();
    let non_zero = cells.iter().filter(|v| **v != 0.0).count();
    let ratio = if cells.is_empty() {
        1.0
    } else {
        non_zero as f64 / cells.len() as f64
    };

    let colorscale = if ratio < 0.1 {
        json!([
            [0, "rgba(255,255,255,0.1)"],
            [0.001, "#440154"],
            [0.1, "#404387"],
            [0.3, "#2a788e"],
            [0.5, "#22a884"],
            [0.7, "#7ad151"],
            [0.9, "#fde725"],
            [1, "#fde725"]
        ])
    } else if ratio < 0.3 {
        json!("RdYlBu_r")
    } else {
        json!("Viridis")
    };

    let trace = json!({
        "type": "heatmap",
        "x": x,
        "y": y,
        "z": z,
        "colorscale": colorscale,
        "showscale": true,
        "hoverongaps": false,
    });
    let layout = json!({
        "title": str_field(obj, "title").unwrap_or_else(|| "Heatmap".to_string()),
        "xaxis": axis_title(obj, "x_label", "X Axis"),
        "yaxis": axis_title(obj, "y_label", "Y Axis"),
    });

    matrix("heatmap", json!([trace]), layout)
}

fn boxplot(obj: &Map<String, Value>) -> NormalizedChart {
    let (Some(columns), Some(data)) = (
        obj.get("columns").and_then(Value::as_array),
        obj.get("data").filter(|v| is_truthy(v)),
    ) else {
        return matrix("boxplot", json!([]), json!({}));
    };

    let traces: Vec<Value> = columns
        .iter()
        .map(|col| {
            let name = display(col);
            let ys = data
                .get(&name)
                .filter(|v| v.is_array())
                .cloned()
                .unwrap_or_else(|| json!([]));
            json!({
                "type": "box",
                "name": name,
                "y": ys,
                "boxpoints": "outliers",
                "boxmean": true,
            })
        })
        .collect();
    let layout = json!({
        "title": str_field(obj, "title").unwrap_or_else(|| "Box Plot".to_string()),
        "xaxis": axis_title(obj, "x_label", "Categories"),
        "yaxis": axis_title(obj, "y_label", "Values"),
        "showlegend": false,
        "boxmode": "group",
    });

    matrix("boxplot", Value::Array(traces), layout)
}
