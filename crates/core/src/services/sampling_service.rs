use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::chart::ChartType;
use crate::models::data_point::DataPoint;
use crate::models::settings::SamplingSettings;

/// Smallest budget min/max decimation can stay under: first, last and one
/// min/max pair.
const MIN_MAX_MIN_BUDGET: usize = 5;

/// How a sampled sequence was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// Input returned unchanged
    Identity,
    /// Evenly spaced indices
    Stride,
    /// Per-bucket minimum and maximum, so spikes stay visible
    MinMax,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    pub points: Vec<DataPoint>,
    pub strategy: SamplingStrategy,
}

impl SampleOutcome {
    pub fn was_sampled(&self) -> bool {
        self.strategy != SamplingStrategy::Identity
    }
}

/// Reduces oversized chart data to a visually equivalent smaller set.
///
/// This is a display optimization, not an aggregation: values are never
/// combined, only rows selected. Output is deterministic, never longer than
/// the input and always keeps the first and last row.
pub struct SamplingService {
    settings: SamplingSettings,
}

impl SamplingService {
    pub fn new() -> Self {
        Self::with_settings(SamplingSettings::default())
    }

    pub fn with_settings(settings: SamplingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SamplingSettings {
        &self.settings
    }

    /// Sample `points` for `chart_type`.
    ///
    /// `max_points` overrides the chart type's threshold. Pie charts are
    /// never sampled.
    pub fn sample(
        &self,
        points: &[DataPoint],
        chart_type: ChartType,
        value_field: &str,
        max_points: Option<usize>,
    ) -> SampleOutcome {
        let identity = || SampleOutcome {
            points: points.to_vec(),
            strategy: SamplingStrategy::Identity,
        };

        let Some(threshold) = self.settings.threshold_for(chart_type) else {
            return identity();
        };
        let limit = max_points.unwrap_or(threshold).max(2);
        if points.len() <= limit {
            return identity();
        }

        let strategy = match chart_type {
            ChartType::Line | ChartType::Area | ChartType::Combination
                if limit >= MIN_MAX_MIN_BUDGET =>
            {
                SamplingStrategy::MinMax
            }
            _ => SamplingStrategy::Stride,
        };

        let indices = match strategy {
            SamplingStrategy::MinMax => min_max_indices(points, value_field, limit),
            _ => stride_indices(points.len(), limit),
        };

        debug!(
            %chart_type,
            ?strategy,
            input = points.len(),
            output = indices.len(),
            limit,
            "sampled chart data"
        );

        SampleOutcome {
            points: indices.into_iter().map(|i| points[i].clone()).collect(),
            strategy,
        }
    }
}

impl Default for SamplingService {
    fn default() -> Self {
        Self::new()
    }
}

/// `m` evenly spaced indices over `0..n`, first and last included.
///
/// Requires `n > m >= 2`; the step then exceeds 1 so indices are strictly
/// increasing.
fn stride_indices(n: usize, m: usize) -> Vec<usize> {
    let span = n - 1;
    let steps = m - 1;
    (0..m).map(|i| (i * span + steps / 2) / steps).collect()
}

/// First, last, and the min/max rows of each interior bucket in index order.
///
/// Emits fewer than `limit` rows. Requires `n > limit >= 5`, which leaves
/// at least two rows per bucket.
fn min_max_indices(points: &[DataPoint], value_field: &str, limit: usize) -> Vec<usize> {
    let n = points.len();
    let interior = n - 2;
    let bucket_count = (limit - 3) / 2;

    let mut out = Vec::with_capacity(limit);
    out.push(0);
    for b in 0..bucket_count {
        let range = 1 + b * interior / bucket_count..1 + (b + 1) * interior / bucket_count;
        push_extrema(points, value_field, range, &mut out);
    }
    out.push(n - 1);
    out
}

fn push_extrema(points: &[DataPoint], value_field: &str, range: Range<usize>, out: &mut Vec<usize>) {
    let mut extrema: Option<((usize, f64), (usize, f64))> = None;
    for i in range.clone() {
        let Some(v) = points[i].number(value_field) else {
            continue;
        };
        extrema = Some(match extrema {
            None => ((i, v), (i, v)),
            Some((min, max)) => (
                if v < min.1 { (i, v) } else { min },
                if v > max.1 { (i, v) } else { max },
            ),
        });
    }

    match extrema {
        // Nothing numeric to rank: keep the bucket's first row as a marker
        None => {
            if !range.is_empty() {
                out.push(range.start);
            }
        }
        Some(((min_idx, _), (max_idx, _))) if min_idx == max_idx => out.push(min_idx),
        Some(((min_idx, _), (max_idx, _))) => {
            out.push(min_idx.min(max_idx));
            out.push(min_idx.max(max_idx));
        }
    }
}
