use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Bucket granularity used to group chart rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationLevel {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl AggregationLevel {
    pub const ALL: [AggregationLevel; 5] = [
        AggregationLevel::Daily,
        AggregationLevel::Weekly,
        AggregationLevel::Monthly,
        AggregationLevel::Quarterly,
        AggregationLevel::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationLevel::Daily => "daily",
            AggregationLevel::Weekly => "weekly",
            AggregationLevel::Monthly => "monthly",
            AggregationLevel::Quarterly => "quarterly",
            AggregationLevel::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for AggregationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(AggregationLevel::Daily),
            "weekly" | "week" => Ok(AggregationLevel::Weekly),
            "monthly" | "month" => Ok(AggregationLevel::Monthly),
            "quarterly" | "quarter" => Ok(AggregationLevel::Quarterly),
            "yearly" | "year" => Ok(AggregationLevel::Yearly),
            _ => Err(CoreError::UnknownAggregationLevel(s.to_string())),
        }
    }
}

/// First day of a weekly bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

/// Canonical identifier of a bucket.
///
/// Invariant: comparing two keys of the same level as strings gives the same
/// order as comparing the periods they name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketKey(String);

impl BucketKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BucketKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
