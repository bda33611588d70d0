use serde::{Deserialize, Serialize};

use super::aggregation::AggregationLevel;
use super::comparison::ComparisonResult;
use super::data_point::AggregatedPoint;

/// Chart kind, as named by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Area,
    Bar,
    Scatter,
    Pie,
    Combination,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartType::Line => write!(f, "line"),
            ChartType::Area => write!(f, "area"),
            ChartType::Bar => write!(f, "bar"),
            ChartType::Scatter => write!(f, "scatter"),
            ChartType::Pie => write!(f, "pie"),
            ChartType::Combination => write!(f, "combination"),
            ChartType::Other => write!(f, "other"),
        }
    }
}

/// Axis configuration attached to a chart payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Field holding the x (date) values
    #[serde(rename = "xAxis", default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,

    /// Field holding the y (numeric) values
    #[serde(rename = "yAxis", default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,

    /// Presentation keys the core does not interpret (colors, trend lines, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A chart as delivered by the analysis service:
/// `{ chartId, type, title, data, config }`.
///
/// `data` is kept as raw JSON here; `IngestService::rows` validates it into
/// rows in one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(rename = "chartId", default)]
    pub chart_id: String,

    #[serde(rename = "type")]
    pub chart_type: ChartType,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub data: serde_json::Value,

    #[serde(default)]
    pub config: ChartConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

/// Render-ready time series for one chart.
///
/// The core computes all the numbers; the frontend only renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesView {
    pub chart_id: String,
    pub chart_type: ChartType,
    pub title: String,

    /// Field the buckets were keyed on
    pub date_field: String,

    /// Fields that were summed per bucket; the first one is primary
    pub value_fields: Vec<String>,

    pub level: AggregationLevel,

    /// Aggregated (and, if oversized, sampled) rows in chronological order
    pub points: Vec<AggregatedPoint>,

    pub comparison: ComparisonResult,

    /// Rows excluded because they were malformed or their date did not resolve
    pub dropped_points: usize,

    /// Whether `points` was reduced by the sampler
    pub sampled: bool,
}
