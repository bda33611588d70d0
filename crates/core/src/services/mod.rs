pub mod aggregation_service;
pub mod bucket_service;
pub mod comparison_service;
pub mod highlight_service;
pub mod ingest_service;
pub mod sampling_service;
