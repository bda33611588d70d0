use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::data_point::AggregatedPoint;
use crate::errors::CoreError;

/// Period-over-period comparison mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComparisonType {
    #[default]
    #[serde(rename = "none")]
    None,
    /// Week over week
    #[serde(rename = "wow", alias = "WoW", alias = "WOW")]
    WoW,
    /// Month over month
    #[serde(rename = "mom", alias = "MoM", alias = "MOM")]
    MoM,
    /// Quarter over quarter
    #[serde(rename = "qoq", alias = "QoQ", alias = "QOQ")]
    QoQ,
    /// Year over year
    #[serde(rename = "yoy", alias = "YoY", alias = "YOY")]
    YoY,
}

impl ComparisonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonType::None => "none",
            ComparisonType::WoW => "wow",
            ComparisonType::MoM => "mom",
            ComparisonType::QoQ => "qoq",
            ComparisonType::YoY => "yoy",
        }
    }
}

impl std::fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonType::None => write!(f, "None"),
            ComparisonType::WoW => write!(f, "WoW"),
            ComparisonType::MoM => write!(f, "MoM"),
            ComparisonType::QoQ => write!(f, "QoQ"),
            ComparisonType::YoY => write!(f, "YoY"),
        }
    }
}

impl FromStr for ComparisonType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(ComparisonType::None),
            "wow" => Ok(ComparisonType::WoW),
            "mom" => Ok(ComparisonType::MoM),
            "qoq" => Ok(ComparisonType::QoQ),
            "yoy" => Ok(ComparisonType::YoY),
            _ => Err(CoreError::UnknownComparisonType(s.to_string())),
        }
    }
}

/// One display row of a comparison table: `current[i]` next to `previous[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub current: AggregatedPoint,
    pub previous: Option<AggregatedPoint>,
}

/// Current vs. previous window for one series.
///
/// Recomputed whenever the aggregation level or comparison type changes;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub comparison_type: ComparisonType,

    /// Most recent period, oldest first
    pub current: Vec<AggregatedPoint>,

    /// Same-length window immediately before `current` (may be shorter)
    pub previous: Vec<AggregatedPoint>,

    /// Positional pairing of the two windows
    pub rows: Vec<ComparisonRow>,

    /// Per value field: sum over `current`
    pub current_totals: BTreeMap<String, f64>,

    /// Per value field: sum over `previous`
    pub previous_totals: BTreeMap<String, f64>,

    /// Per value field: percentage change between the window totals
    pub changes: BTreeMap<String, f64>,

    /// Percentage change of the primary (first) value field
    pub percentage_change: f64,

    /// False when there is no previous window to compare against
    pub has_comparison: bool,
}
