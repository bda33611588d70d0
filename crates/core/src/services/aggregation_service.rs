use std::collections::BTreeMap;

use tracing::debug;

use crate::models::aggregation::{AggregationLevel, BucketKey};
use crate::models::data_point::{AggregatedPoint, DataPoint, FieldValue};
use crate::services::bucket_service::BucketKeyResolver;

/// Result of an aggregation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregationOutcome {
    /// One row per bucket, ascending by bucket key
    pub points: Vec<AggregatedPoint>,

    /// Rows skipped because their date field was missing or unparseable
    pub dropped: usize,
}

/// Groups chart rows into time buckets.
///
/// Per bucket:
/// - each value field is summed (missing or non-numeric cells add 0)
/// - every other field keeps the first value seen in input order
/// - the date field becomes the bucket key
pub struct AggregationService {
    resolver: BucketKeyResolver,
}

impl AggregationService {
    pub fn new() -> Self {
        Self {
            resolver: BucketKeyResolver::new(),
        }
    }

    pub fn with_resolver(resolver: BucketKeyResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &BucketKeyResolver {
        &self.resolver
    }

    pub fn aggregate<S: AsRef<str>>(
        &self,
        points: &[DataPoint],
        level: AggregationLevel,
        date_field: &str,
        value_fields: &[S],
    ) -> AggregationOutcome {
        // BTreeMap keeps buckets in key order, which is chronological order
        let mut buckets: BTreeMap<BucketKey, DataPoint> = BTreeMap::new();
        let mut dropped = 0;

        for point in points {
            let key = match point
                .get(date_field)
                .and_then(|v| self.resolver.resolve_value(v, level))
            {
                Some(key) => key,
                None => {
                    dropped += 1;
                    continue;
                }
            };

            let bucket = buckets.entry(key).or_insert_with_key(|key| {
                let mut row = DataPoint::new();
                row.insert(date_field, key.as_str());
                for field in value_fields {
                    if field.as_ref() != date_field {
                        row.insert(field.as_ref(), 0.0);
                    }
                }
                row
            });

            for field in value_fields {
                let field = field.as_ref();
                if field == date_field {
                    continue;
                }
                if let Some(n) = point.number(field) {
                    let total = bucket.number(field).unwrap_or(0.0);
                    bucket.insert(field, total + n);
                }
            }

            // First-seen wins for everything that is neither date nor value
            for (field, value) in point.iter() {
                if field == date_field
                    || value_fields.iter().any(|f| f.as_ref() == field)
                    || bucket.contains(field)
                {
                    continue;
                }
                bucket.insert(field.clone(), value.clone());
            }
        }

        if dropped > 0 {
            debug!(
                dropped,
                total = points.len(),
                %level,
                date_field,
                "skipped rows with unresolvable dates"
            );
        }

        AggregationOutcome {
            points: buckets.into_values().collect(),
            dropped,
        }
    }

    /// Sum of `field` over every row whose date resolves, i.e. the total an
    /// aggregation of `points` must preserve.
    pub fn valid_total(
        &self,
        points: &[DataPoint],
        level: AggregationLevel,
        date_field: &str,
        field: &str,
    ) -> f64 {
        points
            .iter()
            .filter(|p| {
                p.get(date_field)
                    .and_then(|v| self.resolver.resolve_value(v, level))
                    .is_some()
            })
            .filter_map(|p| p.number(field))
            .sum()
    }
}

impl Default for AggregationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Coerce a cell the way aggregation does: numeric or nothing.
pub(crate) fn numeric_contribution(value: Option<&FieldValue>) -> f64 {
    value.and_then(FieldValue::as_number).unwrap_or(0.0)
}
