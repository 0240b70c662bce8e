// Progressive dashboard stream messages
use super::dashboard::Dashboard;
use super::telemetry::{ChartData, ChartKind, SeriesStyle, TileData};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TileSkeleton {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub precision: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSkeleton {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub style: SeriesStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSkeleton {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    pub marker_ms: Option<i64>,
    pub fraction_digits: Option<i32>,
    pub series: Vec<SeriesSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabSkeleton {
    pub id: String,
    pub title: String,
    pub tiles: Vec<TileSkeleton>,
    pub charts: Vec<ChartSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSkeleton {
    pub title: String,
    pub preset: String,
    pub reference_time_ms: i64,
    pub tabs: Vec<TabSkeleton>,
}

impl DashboardSkeleton {
    pub fn widget_count(&self) -> usize {
        self.tabs.iter().map(|t| t.tiles.len() + t.charts.len()).sum()
    }
}

impl From<&Dashboard> for DashboardSkeleton {
    fn from(dashboard: &Dashboard) -> Self {
        let tabs = dashboard
            .tabs
            .iter()
            .map(|tab| TabSkeleton {
                id: tab.id.clone(),
                title: tab.title.clone(),
                tiles: tab.tiles.iter().map(tile_skeleton).collect(),
                charts: tab.charts.iter().map(chart_skeleton).collect(),
            })
            .collect();

        Self {
            title: dashboard.title.clone(),
            preset: dashboard.preset.clone(),
            reference_time_ms: dashboard.reference_time_ms,
            tabs,
        }
    }
}

fn tile_skeleton(tile: &TileData) -> TileSkeleton {
    TileSkeleton {
        id: tile.id.clone(),
        title: tile.title.clone(),
        unit: tile.unit.clone(),
        precision: tile.precision,
    }
}

fn chart_skeleton(chart: &ChartData) -> ChartSkeleton {
    ChartSkeleton {
        id: chart.id.clone(),
        title: chart.title.clone(),
        unit: chart.unit.clone(),
        kind: chart.kind,
        marker_ms: chart.marker_ms,
        fraction_digits: chart.fraction_digits,
        series: chart
            .series
            .iter()
            .map(|s| SeriesSkeleton {
                id: s.id.clone(),
                name: s.name.clone(),
                color: s.color.clone(),
                style: s.style,
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamMessage {
    Skeleton(DashboardSkeleton),
    #[serde(rename = "tile")]
    TileUpdate { tab_id: String, tile_id: String, value: f64 },
    #[serde(rename = "chart")]
    ChartUpdate { tab_id: String, chart: ChartData },
    Complete { widget_count: usize, duration_ms: u64 },
}
