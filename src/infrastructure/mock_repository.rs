// Mock repository - synthesizes tables instead of querying a data store
use crate::application::imbalance_repository::{ImbalanceRepository, RepositoryError, TableQuery};
use crate::application::series_generator::{GenerationRequest, SeriesGenerator};
use crate::domain::preset::{Preset, PresetCatalog, PresetError};
use crate::domain::series::ImbalanceTable;
use crate::domain::site::SiteId;
use crate::infrastructure::rng_source::RngSource;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct MockImbalanceRepository {
    presets: PresetCatalog,
    /// Used when a query carries no seed. `None` draws from entropy.
    default_seed: Option<u64>,
}

impl MockImbalanceRepository {
    pub fn new(presets: PresetCatalog, default_seed: Option<u64>) -> Self {
        Self {
            presets,
            default_seed,
        }
    }
}

#[async_trait]
impl ImbalanceRepository for MockImbalanceRepository {
    fn preset(&self, name: &str) -> Result<Preset, PresetError> {
        self.presets.get(name).cloned()
    }

    fn presets(&self) -> Vec<Preset> {
        self.presets.iter().cloned().collect()
    }

    async fn list_site_ids(&self, preset: &str) -> Result<Vec<SiteId>, RepositoryError> {
        Ok(self.presets.get(preset)?.sites.clone())
    }

    async fn load_table(&self, query: &TableQuery) -> Result<ImbalanceTable, RepositoryError> {
        let preset = self.presets.get(&query.preset)?;
        let sites = query.selection.resolve(&preset.sites)?;
        let thresholds = query.thresholds.unwrap_or(preset.thresholds);
        thresholds.validate()?;
        let request = GenerationRequest::from_preset(preset, query.reference_time, sites, thresholds);

        let table = match query.seed.or(self.default_seed) {
            Some(seed) => {
                tracing::debug!("Generating {} table with seed {}", preset.name, seed);
                SeriesGenerator::generate(&request, &mut RngSource::seeded(seed))?
            }
            None => SeriesGenerator::generate(&request, &mut RngSource::from_entropy())?,
        };
        tracing::debug!("Loaded {} rows for preset {}", table.row_count(), preset.name);
        Ok(table)
    }
}
