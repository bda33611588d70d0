use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::data_point::DataPoint;

/// The active highlight of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightState {
    pub chart_id: String,

    /// Partial row used as a match key. For propagated highlights this holds
    /// only the relationship's match key.
    pub data_point: DataPoint,

    /// Series key the highlight belongs to, if the chart has several
    #[serde(default)]
    pub data_key: Option<String>,

    /// Index of the highlighted row within the chart's data
    #[serde(default)]
    pub index: Option<usize>,

    pub timestamp: DateTime<Utc>,
}

/// Declares that highlighting a point in one chart highlights the matching
/// point (by `match_key`) in another. Lookups check both directions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightRelationship {
    pub source_chart_id: String,
    pub target_chart_id: String,
    pub match_key: String,
}

impl HighlightRelationship {
    pub fn new(
        source_chart_id: impl Into<String>,
        target_chart_id: impl Into<String>,
        match_key: impl Into<String>,
    ) -> Self {
        Self {
            source_chart_id: source_chart_id.into(),
            target_chart_id: target_chart_id.into(),
            match_key: match_key.into(),
        }
    }

    /// True if this relationship connects the two charts, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source_chart_id == a && self.target_chart_id == b)
            || (self.source_chart_id == b && self.target_chart_id == a)
    }

    /// The chart on the other side of `chart_id`, if it takes part.
    pub fn other_side(&self, chart_id: &str) -> Option<&str> {
        if self.source_chart_id == chart_id {
            Some(&self.target_chart_id)
        } else if self.target_chart_id == chart_id {
            Some(&self.source_chart_id)
        } else {
            None
        }
    }
}
