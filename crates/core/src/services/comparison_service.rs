use std::collections::BTreeMap;

use chrono::{Days, Months, NaiveDate};
use tracing::debug;

use crate::models::comparison::{ComparisonResult, ComparisonRow, ComparisonType};
use crate::models::data_point::AggregatedPoint;
use crate::services::aggregation_service::numeric_contribution;
use crate::services::bucket_service::parse_date;

/// Splits a series into a "current" and a "previous" period and compares
/// their totals.
///
/// The split point (anchor) is the latest date shifted back by one
/// comparison period:
/// - `current` holds every row dated after the anchor
/// - `previous` holds the last `current.len()` rows of the period before,
///   dated after `anchor - offset` and on or before `anchor`
///
/// The windows never overlap and line up on calendar periods: YoY pairs
/// the same months a year apart, and a missing bucket in the prior period
/// shortens `previous` instead of pulling in older rows. For series
/// bucketed at the comparison's granularity the windows have equal length
/// whenever the series holds at least twice as many rows as `current`.
pub struct ComparisonService;

impl ComparisonService {
    pub fn new() -> Self {
        Self
    }

    pub fn compare<S: AsRef<str>>(
        &self,
        points: &[AggregatedPoint],
        comparison_type: ComparisonType,
        date_field: &str,
        value_fields: &[S],
    ) -> ComparisonResult {
        let mut dated: Vec<(NaiveDate, &AggregatedPoint)> = points
            .iter()
            .filter_map(|p| p.get(date_field).and_then(parse_date).map(|d| (d, p)))
            .collect();
        // Stable: rows sharing a date keep their input order
        dated.sort_by_key(|(date, _)| *date);

        let anchor = dated
            .last()
            .and_then(|(latest, _)| shift_back(*latest, comparison_type));

        let (current, previous) = match anchor {
            Some(anchor) => {
                let split = dated.partition_point(|(date, _)| *date <= anchor);
                let current = &dated[split..];
                let floor = match shift_back(anchor, comparison_type) {
                    Some(lower) => dated[..split].partition_point(|(date, _)| *date <= lower),
                    None => 0,
                };
                let start = floor.max(split.saturating_sub(current.len()));
                (current, &dated[start..split])
            }
            None => (&dated[..], &dated[..0]),
        };

        debug!(
            %comparison_type,
            current = current.len(),
            previous = previous.len(),
            skipped = points.len() - dated.len(),
            "split comparison windows"
        );

        let current: Vec<AggregatedPoint> = current.iter().map(|(_, p)| (*p).clone()).collect();
        let previous: Vec<AggregatedPoint> = previous.iter().map(|(_, p)| (*p).clone()).collect();
        self.build_result(comparison_type, current, previous, value_fields)
    }

    fn build_result<S: AsRef<str>>(
        &self,
        comparison_type: ComparisonType,
        current: Vec<AggregatedPoint>,
        previous: Vec<AggregatedPoint>,
        value_fields: &[S],
    ) -> ComparisonResult {
        let has_comparison = !previous.is_empty();

        let mut current_totals = BTreeMap::new();
        let mut previous_totals = BTreeMap::new();
        let mut changes = BTreeMap::new();

        for field in value_fields {
            let field = field.as_ref();
            let cur = window_total(&current, field);
            let prev = window_total(&previous, field);
            let change = if has_comparison {
                percentage_change(cur, prev)
            } else {
                0.0
            };
            current_totals.insert(field.to_string(), cur);
            previous_totals.insert(field.to_string(), prev);
            changes.insert(field.to_string(), change);
        }

        let percentage_change = value_fields
            .first()
            .and_then(|f| changes.get(f.as_ref()).copied())
            .unwrap_or(0.0);

        let rows = current
            .iter()
            .enumerate()
            .map(|(i, row)| ComparisonRow {
                current: row.clone(),
                previous: previous.get(i).cloned(),
            })
            .collect();

        ComparisonResult {
            comparison_type,
            current,
            previous,
            rows,
            current_totals,
            previous_totals,
            changes,
            percentage_change,
            has_comparison,
        }
    }
}

impl Default for ComparisonService {
    fn default() -> Self {
        Self::new()
    }
}

/// `date` moved back by one comparison period, clamped to month end
/// (2024-03-31 minus one month is 2024-02-29).
///
/// `None` for `ComparisonType::None` or when the shift leaves the
/// representable range.
pub fn shift_back(date: NaiveDate, comparison_type: ComparisonType) -> Option<NaiveDate> {
    match comparison_type {
        ComparisonType::None => None,
        ComparisonType::WoW => date.checked_sub_days(Days::new(7)),
        ComparisonType::MoM => date.checked_sub_months(Months::new(1)),
        ComparisonType::QoQ => date.checked_sub_months(Months::new(3)),
        ComparisonType::YoY => date.checked_sub_months(Months::new(12)),
    }
}

/// Signed percentage change from `previous` to `current`.
///
/// `(current - previous) / |previous| * 100`. With a zero previous total the
/// result is 0 if `current` is also 0, otherwise +100 whatever the sign of
/// `current`. Never NaN or infinite.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    let change = if previous == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (current - previous) / previous.abs() * 100.0
    };
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

fn window_total(points: &[AggregatedPoint], field: &str) -> f64 {
    points
        .iter()
        .map(|p| numeric_contribution(p.get(field)))
        .sum()
}
