pub mod aggregation;
pub mod chart;
pub mod comparison;
pub mod data_point;
pub mod highlight;
pub mod settings;
