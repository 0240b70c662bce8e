// Dashboard domain model
use super::telemetry::{ChartData, TileData};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardTab {
    pub id: String,
    pub title: String,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartData>,
}

impl DashboardTab {
    pub fn new(id: &str, title: &str, tiles: Vec<TileData>, charts: Vec<ChartData>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            tiles,
            charts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub preset: String,
    pub reference_time_ms: i64,
    pub tabs: Vec<DashboardTab>,
}

impl Dashboard {
    pub fn new(title: String, preset: String, reference_time_ms: i64, tabs: Vec<DashboardTab>) -> Self {
        Self {
            title,
            preset,
            reference_time_ms,
            tabs,
        }
    }
}

#[cfg(test)]
impl Dashboard {
    pub fn tile(&self, id: &str) -> Option<&TileData> {
        self.tabs.iter().flat_map(|t| &t.tiles).find(|t| t.id == id)
    }

    pub fn chart(&self, id: &str) -> Option<&ChartData> {
        self.tabs.iter().flat_map(|t| &t.charts).find(|c| c.id == id)
    }
}
