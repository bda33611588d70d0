pub mod errors;
pub mod models;
pub mod services;

use models::{
    aggregation::AggregationLevel,
    chart::{ChartPayload, ChartType, TimeSeriesView},
    comparison::{ComparisonResult, ComparisonType},
    data_point::DataPoint,
    settings::EngineSettings,
};
use services::{
    aggregation_service::{AggregationOutcome, AggregationService},
    bucket_service::BucketKeyResolver,
    comparison_service::ComparisonService,
    highlight_service::HighlightCoordinator,
    ingest_service::IngestService,
    sampling_service::{SampleOutcome, SamplingService},
};
use tracing::debug;

use errors::CoreError;

/// Main entry point for the DataStory core library.
/// Holds the engine settings, the services configured from them and the
/// page-lifetime highlight registry.
#[must_use]
pub struct DataStoryEngine {
    settings: EngineSettings,
    aggregation_service: AggregationService,
    comparison_service: ComparisonService,
    sampling_service: SamplingService,
    ingest_service: IngestService,
    highlights: HighlightCoordinator,
}

impl std::fmt::Debug for DataStoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStoryEngine")
            .field("settings", &self.settings)
            .field("active_highlights", &self.highlights.highlights().len())
            .field("relationships", &self.highlights.relationships().len())
            .finish()
    }
}

impl Default for DataStoryEngine {
    fn default() -> Self {
        Self::build(EngineSettings::default())
    }
}

impl DataStoryEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom settings (validated first).
    pub fn with_settings(settings: EngineSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: EngineSettings) -> Self {
        Self {
            aggregation_service: AggregationService::with_resolver(
                BucketKeyResolver::with_week_start(settings.week_start),
            ),
            comparison_service: ComparisonService::new(),
            sampling_service: SamplingService::with_settings(settings.sampling.clone()),
            ingest_service: IngestService::new(),
            highlights: HighlightCoordinator::new(),
            settings,
        }
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Replace the settings. Highlights and relationships survive.
    pub fn update_settings(&mut self, settings: EngineSettings) -> Result<(), CoreError> {
        settings.validate()?;
        self.aggregation_service =
            AggregationService::with_resolver(BucketKeyResolver::with_week_start(settings.week_start));
        self.sampling_service = SamplingService::with_settings(settings.sampling.clone());
        self.settings = settings;
        Ok(())
    }

    // ── Highlights ──────────────────────────────────────────────────

    /// The shared highlight registry. Clone the handle to hand it to chart
    /// controllers; all clones see the same state.
    #[must_use]
    pub fn highlights(&self) -> &HighlightCoordinator {
        &self.highlights
    }

    // ── Time series ─────────────────────────────────────────────────

    /// Bucket `points` at `level`, summing `value_fields`.
    #[must_use]
    pub fn aggregate<S: AsRef<str>>(
        &self,
        points: &[DataPoint],
        level: AggregationLevel,
        date_field: &str,
        value_fields: &[S],
    ) -> AggregationOutcome {
        self.aggregation_service
            .aggregate(points, level, date_field, value_fields)
    }

    /// Compare the most recent period of `points` with the one before it.
    #[must_use]
    pub fn compare<S: AsRef<str>>(
        &self,
        points: &[DataPoint],
        comparison_type: ComparisonType,
        date_field: &str,
        value_fields: &[S],
    ) -> ComparisonResult {
        self.comparison_service
            .compare(points, comparison_type, date_field, value_fields)
    }

    /// Reduce `points` for rendering as `chart_type`.
    #[must_use]
    pub fn sample(
        &self,
        points: &[DataPoint],
        chart_type: ChartType,
        value_field: &str,
        max_points: Option<usize>,
    ) -> SampleOutcome {
        self.sampling_service
            .sample(points, chart_type, value_field, max_points)
    }

    /// Ingest a chart payload and run the full pipeline:
    /// 1. Read `data` into rows, skipping malformed ones, and resolve the
    ///    date/value fields
    /// 2. Aggregate at `level`
    /// 3. Compare periods per `comparison_type`
    /// 4. Sample the aggregated rows for the chart type
    pub fn build_time_series_view(
        &self,
        payload: &ChartPayload,
        level: AggregationLevel,
        comparison_type: ComparisonType,
    ) -> Result<TimeSeriesView, CoreError> {
        let ingested = self.ingest_service.rows(payload)?;
        let rows = ingested.rows;
        let fields = self
            .ingest_service
            .resolve_fields(payload, &rows, &self.settings);

        let aggregated = self.aggregate(&rows, level, &fields.date_field, &fields.value_fields);
        let comparison = self.compare(
            &aggregated.points,
            comparison_type,
            &fields.date_field,
            &fields.value_fields,
        );

        let primary = fields.value_fields.first().map(String::as_str).unwrap_or_default();
        let sampled = self.sample(&aggregated.points, payload.chart_type, primary, None);

        debug!(
            chart_id = %payload.chart_id,
            rows = rows.len(),
            buckets = aggregated.points.len(),
            rendered = sampled.points.len(),
            "built time series view"
        );

        Ok(TimeSeriesView {
            chart_id: payload.chart_id.clone(),
            chart_type: payload.chart_type,
            title: payload.title.clone(),
            date_field: fields.date_field,
            value_fields: fields.value_fields,
            level,
            sampled: sampled.was_sampled(),
            points: sampled.points,
            comparison,
            dropped_points: aggregated.dropped + ingested.skipped,
        })
    }

    /// Same as `build_time_series_view`, from the payload's JSON text.
    pub fn build_time_series_view_from_json(
        &self,
        json: &str,
        level: AggregationLevel,
        comparison_type: ComparisonType,
    ) -> Result<TimeSeriesView, CoreError> {
        let payload = self.ingest_service.parse_payload(json)?;
        self.build_time_series_view(&payload, level, comparison_type)
    }
}
