use thiserror::Error;

/// Unified error type for the entire datastory-core library.
///
/// Only the ingestion boundary and configuration are fallible. Bucketing,
/// aggregation, comparison and sampling degrade to "less data" instead of
/// returning errors.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Ingestion ───────────────────────────────────────────────────
    #[error("Invalid chart payload: {0}")]
    InvalidPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Unknown aggregation level: {0}")]
    UnknownAggregationLevel(String),

    #[error("Unknown comparison type: {0}")]
    UnknownComparisonType(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
