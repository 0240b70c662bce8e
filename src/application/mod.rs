// Application layer - Use cases and ports
pub mod dashboard_service;
pub mod imbalance_repository;
pub mod random_source;
pub mod series_generator;
pub mod site_service;
pub mod streaming_service;
