use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

/// Chart types understood by the renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartType {
    Histogram,
    Line,
    Bar,
    Pie,
    Scatter,
    StackedBar,
    Heatmap,
    Boxplot,
}

impl ChartType {
    pub const ALL: [ChartType; 8] = [
        ChartType::Histogram,
        ChartType::Line,
        ChartType::Bar,
        ChartType::Pie,
        ChartType::Scatter,
        ChartType::StackedBar,
        ChartType::Heatmap,
        ChartType::Boxplot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Histogram => "histogram",
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::StackedBar => "stacked_bar",
            ChartType::Heatmap => "heatmap",
            ChartType::Boxplot => "boxplot",
        }
    }

    pub fn route(&self) -> ChartRoute {
        match self {
            ChartType::Heatmap | ChartType::Boxplot => ChartRoute::Matrix,
            _ => ChartRoute::Categorical,
        }
    }
}

impl FromStr for ChartType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// Which external renderer a chart block is handed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRoute {
    /// Series renderer: histogram, line, bar, pie, scatter, stacked_bar and unknown types
    Categorical,
    /// Matrix/statistical renderer: heatmap, boxplot
    Matrix,
}

/// Chart payload coerced to the shape its renderer expects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedChart {
    Categorical {
        #[serde(rename = "type")]
        chart_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        x_label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        y_label: Option<String>,
        data: Vec<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        y_cols: Option<Vec<String>>,
    },
    Matrix {
        #[serde(rename = "type")]
        chart_type: String,
        plotly_data: Value,
        plotly_layout: Value,
    },
}

impl NormalizedChart {
    pub fn route(&self) -> ChartRoute {
        match self {
            NormalizedChart::Categorical { .. } => ChartRoute::Categorical,
            NormalizedChart::Matrix { .. } => ChartRoute::Matrix,
        }
    }

    pub fn chart_type(&self) -> &str {
        match self {
            NormalizedChart::Categorical { chart_type, .. }
            | NormalizedChart::Matrix { chart_type, .. } => chart_type,
        }
    }
}
