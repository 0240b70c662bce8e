// Site service - Use case for listing a preset's sites
use crate::application::imbalance_repository::{ImbalanceRepository, RepositoryError};
use crate::domain::site::Site;
use std::sync::Arc;

#[derive(Clone)]
pub struct SiteService {
    repository: Arc<dyn ImbalanceRepository>,
}

impl SiteService {
    pub fn new(repository: Arc<dyn ImbalanceRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_sites(&self, preset: &str) -> Result<Vec<Site>, RepositoryError> {
        let ids = self.repository.list_site_ids(preset).await?;
        Ok(ids.into_iter().map(Site::new).collect())
    }
}
