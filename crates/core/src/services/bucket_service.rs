use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};

use crate::models::aggregation::{AggregationLevel, BucketKey, WeekStart};
use crate::models::data_point::FieldValue;

/// Keys use four-digit years; anything outside this range would break
/// lexicographic ordering.
const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Maps dates onto canonical bucket keys.
///
/// Keys per level:
/// - daily: `YYYY-MM-DD`
/// - weekly: week-start date, `YYYY-MM-DD`
/// - monthly: `YYYY-MM`
/// - quarterly: `YYYY-Qn`
/// - yearly: `YYYY`
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketKeyResolver {
    week_start: WeekStart,
}

impl BucketKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_week_start(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Resolve `date` into its bucket key, or `None` if the bucket falls
    /// outside the representable year range.
    pub fn resolve(&self, date: NaiveDate, level: AggregationLevel) -> Option<BucketKey> {
        let start = self.bucket_start(date, level)?;
        let year = start.year();
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }

        let key = match level {
            AggregationLevel::Daily | AggregationLevel::Weekly => {
                format!("{:04}-{:02}-{:02}", year, start.month(), start.day())
            }
            AggregationLevel::Monthly => format!("{:04}-{:02}", year, start.month()),
            AggregationLevel::Quarterly => format!("{:04}-Q{}", year, quarter_of(start.month())),
            AggregationLevel::Yearly => format!("{year:04}"),
        };
        Some(BucketKey::new(key))
    }

    /// Parse a raw field value and resolve it in one step.
    pub fn resolve_value(&self, value: &FieldValue, level: AggregationLevel) -> Option<BucketKey> {
        parse_date(value).and_then(|date| self.resolve(date, level))
    }

    /// First calendar day of the bucket containing `date`.
    pub fn bucket_start(&self, date: NaiveDate, level: AggregationLevel) -> Option<NaiveDate> {
        match level {
            AggregationLevel::Daily => Some(date),
            AggregationLevel::Weekly => {
                let into_week = match self.week_start {
                    WeekStart::Monday => date.weekday().num_days_from_monday(),
                    WeekStart::Sunday => date.weekday().num_days_from_sunday(),
                };
                date.checked_sub_days(Days::new(u64::from(into_week)))
            }
            AggregationLevel::Monthly => date.with_day(1),
            AggregationLevel::Quarterly => {
                let first_month = (quarter_of(date.month()) - 1) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), first_month, 1)
            }
            AggregationLevel::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
    }
}

/// Quarter index 1–4 for a month 1–12.
pub fn quarter_of(month: u32) -> u32 {
    month.div_ceil(3)
}

/// Parse a chart cell into a calendar date.
///
/// Accepts ISO/RFC 3339 timestamps, plain dates (`YYYY-MM-DD`, `YYYY/MM/DD`,
/// `MM/DD/YYYY`), bucket keys (`YYYY-MM`, `YYYY-Qn`, `YYYY`, parsed to the
/// bucket start) and numbers as Unix epoch milliseconds. Everything else is
/// `None`; callers drop such rows.
pub fn parse_date(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Text(s) => parse_date_str(s),
        FieldValue::Number(ms) => {
            if !ms.is_finite() {
                return None;
            }
            DateTime::from_timestamp_millis(*ms as i64).map(|dt| dt.date_naive())
        }
        FieldValue::Null | FieldValue::Bool(_) => None,
    }
}

pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    parse_bucket_key(s)
}

/// `YYYY-Qn`, `YYYY-MM` or `YYYY` to the first day of that period.
fn parse_bucket_key(s: &str) -> Option<NaiveDate> {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    if let Some((year, quarter)) = s.split_once("-Q") {
        if year.len() != 4 || !all_digits(year) || quarter.len() != 1 || !all_digits(quarter) {
            return None;
        }
        let quarter: u32 = quarter.parse().ok()?;
        if !(1..=4).contains(&quarter) {
            return None;
        }
        return NaiveDate::from_ymd_opt(year.parse().ok()?, (quarter - 1) * 3 + 1, 1);
    }

    if let Some((year, month)) = s.split_once('-') {
        if year.len() != 4 || !all_digits(year) || month.len() != 2 || !all_digits(month) {
            return None;
        }
        return NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1);
    }

    if s.len() == 4 && all_digits(s) {
        return NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1);
    }
    None
}
