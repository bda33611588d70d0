use serde_json::Value;
use tracing::warn;

use crate::errors::CoreError;
use crate::models::chart::ChartPayload;
use crate::models::data_point::{DataPoint, FieldValue};
use crate::models::settings::EngineSettings;

/// Field names the engine should key and sum on for one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    pub date_field: String,
    /// Primary value field first
    pub value_fields: Vec<String>,
}

/// Rows read from a payload's `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub rows: Vec<DataPoint>,
    /// Rows left out because they were not flat objects
    pub skipped: usize,
}

/// Validates analysis-service chart payloads into typed rows.
///
/// This is the single input boundary: everything downstream works on
/// `DataPoint`s and never re-checks shapes.
pub struct IngestService;

impl IngestService {
    pub fn new() -> Self {
        Self
    }

    /// Parse a `{ chartId, type, title, data, config }` document.
    pub fn parse_payload(&self, json: &str) -> Result<ChartPayload, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize `payload.data` into rows.
    ///
    /// Accepts an array of objects, or a column-oriented object whose array
    /// entries (`x`/`y`, `categories`/`values`, `labels`/`values`/`percentages`)
    /// are zipped by index. Scalar entries of a column object (axis labels)
    /// are ignored. `null` or scalar `data` means no rows.
    ///
    /// Rows that are not objects, or that hold a nested array or object, are
    /// skipped and counted. Columns of unequal length are the one shape that
    /// cannot be zipped and fail the whole payload.
    pub fn rows(&self, payload: &ChartPayload) -> Result<IngestOutcome, CoreError> {
        let mut skipped = 0;
        let rows: Vec<DataPoint> = match &payload.data {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| {
                    let row = match item {
                        Value::Object(obj) => scalar_row(obj.iter()),
                        _ => None,
                    };
                    if row.is_none() {
                        skipped += 1;
                    }
                    row
                })
                .collect(),
            Value::Object(obj) => {
                let columns: Vec<(&String, &Vec<Value>)> = obj
                    .iter()
                    .filter_map(|(k, v)| v.as_array().map(|arr| (k, arr)))
                    .collect();
                let len = columns.first().map_or(0, |(_, col)| col.len());
                if let Some((name, col)) = columns.iter().find(|(_, col)| col.len() != len) {
                    let first_name = columns.first().map_or("", |(n, _)| n.as_str());
                    return Err(CoreError::InvalidPayload(format!(
                        "column '{name}' has {} values but '{first_name}' has {len}",
                        col.len()
                    )));
                }

                (0..len)
                    .filter_map(|i| {
                        let row = scalar_row(columns.iter().map(|(name, col)| (*name, &col[i])));
                        if row.is_none() {
                            skipped += 1;
                        }
                        row
                    })
                    .collect()
            }
            other => {
                warn!(
                    chart_id = %payload.chart_id,
                    kind = kind(other),
                    "chart data is neither an array nor an object"
                );
                Vec::new()
            }
        };

        if skipped > 0 {
            warn!(chart_id = %payload.chart_id, skipped, "skipped malformed chart rows");
        }

        Ok(IngestOutcome { rows, skipped })
    }

    /// Pick the date and value fields for `rows`.
    ///
    /// Candidates are tried in order and the first present in any row wins:
    /// the chart config's axis, the settings default, then `x` / `y`.
    pub fn resolve_fields(
        &self,
        payload: &ChartPayload,
        rows: &[DataPoint],
        settings: &EngineSettings,
    ) -> ResolvedFields {
        let date_field = pick_field(
            payload,
            rows,
            "xAxis",
            payload.config.x_axis.as_deref(),
            &[settings.default_date_field.as_str(), "x"],
        );
        let value_field = pick_field(
            payload,
            rows,
            "yAxis",
            payload.config.y_axis.as_deref(),
            &[settings.default_value_field.as_str(), "y", "values"],
        );

        ResolvedFields {
            date_field,
            value_fields: vec![value_field],
        }
    }
}

impl Default for IngestService {
    fn default() -> Self {
        Self::new()
    }
}

fn pick_field(
    payload: &ChartPayload,
    rows: &[DataPoint],
    axis: &str,
    configured: Option<&str>,
    candidates: &[&str],
) -> String {
    let present = |field: &str| rows.iter().any(|r| r.contains(field));

    if let Some(name) = configured {
        if present(name) {
            return name.to_string();
        }
        if !rows.is_empty() {
            warn!(
                chart_id = %payload.chart_id,
                axis,
                field = name,
                "configured field not found in chart data"
            );
        }
    }

    candidates
        .iter()
        .copied()
        .find(|&f| present(f))
        .or(configured)
        .or_else(|| candidates.first().copied())
        .unwrap_or_default()
        .to_string()
}

/// `None` as soon as one field is not a scalar.
fn scalar_row<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>) -> Option<DataPoint> {
    fields
        .map(|(k, v)| to_field_value(v).map(|fv| (k.clone(), fv)))
        .collect()
}

fn to_field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => Some(FieldValue::Null),
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
