// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::imbalance_repository::ImbalanceRepository;
use crate::application::site_service::SiteService;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::config::DashboardSettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ImbalanceRepository>,
    pub site_service: SiteService,
    pub dashboard_service: DashboardService,
    pub streaming_service: StreamingDashboardService,
    pub settings: DashboardSettings,
}

impl AppState {
    pub fn new(repository: Arc<dyn ImbalanceRepository>, settings: DashboardSettings) -> Self {
        Self {
            site_service: SiteService::new(repository.clone()),
            dashboard_service: DashboardService::new(repository.clone()),
            streaming_service: StreamingDashboardService::new(repository.clone()),
            repository,
            settings,
        }
    }
}
