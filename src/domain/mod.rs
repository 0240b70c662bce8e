// Domain layer - Portfolio, series and dashboard models
pub mod dashboard;
pub mod distribution;
pub mod preset;
pub mod series;
pub mod site;
pub mod stream;
pub mod telemetry;
pub mod thresholds;
