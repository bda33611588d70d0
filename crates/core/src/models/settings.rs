use serde::{Deserialize, Serialize};

use super::aggregation::WeekStart;
use super::chart::ChartType;
use crate::errors::CoreError;

/// Per-chart-type point budgets before the sampler kicks in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    pub line_threshold: usize,
    pub area_threshold: usize,
    pub bar_threshold: usize,
    pub scatter_threshold: usize,
    pub combination_threshold: usize,
    /// Fallback for chart types without a dedicated threshold
    pub default_threshold: usize,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            line_threshold: 1000,
            area_threshold: 1000,
            bar_threshold: 200,
            scatter_threshold: 2000,
            combination_threshold: 1000,
            default_threshold: 500,
        }
    }
}

impl SamplingSettings {
    /// Budget for `chart_type`, or `None` if the type is never sampled (pie).
    pub fn threshold_for(&self, chart_type: ChartType) -> Option<usize> {
        match chart_type {
            ChartType::Line => Some(self.line_threshold),
            ChartType::Area => Some(self.area_threshold),
            ChartType::Bar => Some(self.bar_threshold),
            ChartType::Scatter => Some(self.scatter_threshold),
            ChartType::Combination => Some(self.combination_threshold),
            ChartType::Pie => None,
            ChartType::Other => Some(self.default_threshold),
        }
    }
}

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Day that opens a weekly bucket
    pub week_start: WeekStart,

    /// Date field used when the chart config names none
    pub default_date_field: String,

    /// Value field used when the chart config names none
    pub default_value_field: String,

    pub sampling: SamplingSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Monday,
            default_date_field: "date".to_string(),
            default_value_field: "value".to_string(),
            sampling: SamplingSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Parse settings from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.default_date_field.trim().is_empty() {
            return Err(CoreError::InvalidSettings(
                "default_date_field must not be empty".into(),
            ));
        }
        if self.default_value_field.trim().is_empty() {
            return Err(CoreError::InvalidSettings(
                "default_value_field must not be empty".into(),
            ));
        }

        let s = &self.sampling;
        for (name, value) in [
            ("line_threshold", s.line_threshold),
            ("area_threshold", s.area_threshold),
            ("bar_threshold", s.bar_threshold),
            ("scatter_threshold", s.scatter_threshold),
            ("combination_threshold", s.combination_threshold),
            ("default_threshold", s.default_threshold),
        ] {
            // First and last point are always kept
            if value < 2 {
                return Err(CoreError::InvalidSettings(format!(
                    "sampling.{name} must be at least 2, got {value}"
                )));
            }
        }
        Ok(())
    }
}
