// Repository trait for imbalance data access
use crate::domain::distribution::ParameterError;
use crate::domain::preset::{Preset, PresetError};
use crate::domain::series::ImbalanceTable;
use crate::domain::site::{SelectionError, SiteId, SiteSelection};
use crate::domain::thresholds::Thresholds;
use crate::application::series_generator::GenerateError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Everything a caller controls for one table.
#[derive(Debug, Clone)]
pub struct TableQuery {
    pub preset: String,
    pub reference_time: DateTime<Utc>,
    pub selection: SiteSelection,
    /// Falls back to the preset's bounds when absent.
    pub thresholds: Option<Thresholds>,
    pub seed: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("invalid threshold {0}")]
    Thresholds(#[from] ParameterError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

#[async_trait]
pub trait ImbalanceRepository: Send + Sync {
    /// Look up a preset by name
    fn preset(&self, name: &str) -> Result<Preset, PresetError>;

    /// All presets, ordered by name
    fn presets(&self) -> Vec<Preset>;

    /// Site catalog of a preset
    async fn list_site_ids(&self, preset: &str) -> Result<Vec<SiteId>, RepositoryError>;

    /// Produce a fresh table; nothing is cached between calls
    async fn load_table(&self, query: &TableQuery) -> Result<ImbalanceTable, RepositoryError>;
}
