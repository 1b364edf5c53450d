//! Chart payload sniffing, routing and normalization.

pub mod detect;
pub mod normalize;
pub mod sniff;

pub use detect::{
    ChartShape, detect_shape, is_chart_data, is_known_chart_envelope, route_for,
};
pub use normalize::{bucket_values, normalize};
pub use sniff::{ChartMatch, MatchSource, sniff, split_span};

use crate::models::NormalizedChart;

/// Parse chart JSON text and normalize it; `None` unless it is an object
pub fn normalize_json(json: &str) -> Option<NormalizedChart> {
    detect::parse_json(json)
        .filter(|v| v.is_object())
        .map(|v| normalize(&v))
}
