// Dashboard service - Use case for building dashboards
use crate::application::imbalance_repository::{ImbalanceRepository, RepositoryError, TableQuery};
use crate::domain::dashboard::{Dashboard, DashboardTab};
use crate::domain::preset::Preset;
use crate::domain::series::{ImbalanceTable, SiteReading};
use crate::domain::site::SiteId;
use crate::domain::telemetry::{
    downsample_points, ChartData, ChartKind, SeriesData, SeriesStyle, TileData, TimeSeriesPoint,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

const MAX_POINTS_PER_SERIES: usize = 150;

#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub show_alerts: bool,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self { show_alerts: true }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn ImbalanceRepository>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn ImbalanceRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_dashboard(
        &self,
        query: &TableQuery,
        options: DashboardOptions,
    ) -> Result<Dashboard, RepositoryError> {
        let preset = self.repository.preset(&query.preset)?;
        let table = self.repository.load_table(query).await?;
        Ok(build_dashboard(&preset, &table, options))
    }
}

/// Lay out the three dashboard tabs for one generated table.
pub fn build_dashboard(preset: &Preset, table: &ImbalanceTable, options: DashboardOptions) -> Dashboard {
    let reference_ms = table.reference_time.timestamp_millis();
    let title = format!(
        "{} ({})",
        preset.title,
        table.reference_time.format("%Y-%m-%d %H:%M UTC")
    );

    let tabs = vec![
        portfolio_tab(preset, table, options, reference_ms),
        site_tab(preset, table, reference_ms),
        market_tab(table, reference_ms),
    ];

    Dashboard::new(title, preset.name.clone(), reference_ms, tabs)
}

fn portfolio_tab(
    preset: &Preset,
    table: &ImbalanceTable,
    options: DashboardOptions,
    reference_ms: i64,
) -> DashboardTab {
    let mut tiles = Vec::new();
    if options.show_alerts {
        let counts = table.alert_counts();
        tiles.push(TileData::new(
            "alerts-volume",
            "Imbalance alerts",
            "",
            counts.volume as f64,
            0,
        ));
        if table.thresholds.price.is_active() {
            tiles.push(TileData::new("alerts-price", "Price alerts", "", counts.price as f64, 0));
        }
        if table.thresholds.cost.is_active() {
            tiles.push(TileData::new("alerts-cost", "Cost alerts", "", counts.cost as f64, 0));
        }
    }

    let chart = ChartData::new(
        "portfolio-consumption",
        "Aggregated Portfolio Consumption",
        Some("MW"),
        ChartKind::Line,
        vec![
            series(
                "scheduled-total",
                "Scheduled",
                Some("blue"),
                SeriesStyle::Solid,
                table.column(|r| r.totals().scheduled),
            ),
            series(
                "actual-total",
                "Actual",
                Some("red"),
                SeriesStyle::Dotted,
                table.column(|r| r.totals().actual),
            ),
        ],
    )
    .with_marker(reference_ms);

    tracing::debug!("Portfolio tab for {}: {} tiles", preset.name, tiles.len());

    DashboardTab::new("portfolio", "Portfolio Overview", tiles, vec![chart])
}

fn site_tab(preset: &Preset, table: &ImbalanceTable, reference_ms: i64) -> DashboardTab {
    let mut tiles = vec![
        TileData::new(
            "activations-count",
            "# Activations",
            "",
            table.activation_count() as f64,
            0,
        ),
        TileData::new(
            "activations-energy",
            "Energy",
            "MWh",
            table.activation_energy_mwh(),
            1,
        ),
    ];
    if let Some(mean) = table.mean_price() {
        tiles.push(TileData::new("avg-price", "Avg Price", "€/MWh", mean, 0));
    }

    // Focus on the first selected site
    let charts = table
        .sites
        .first()
        .map(|site| vec![site_chart(preset, table, site, reference_ms)])
        .unwrap_or_default();

    DashboardTab::new("site-flex", "Site-Level Flex", tiles, charts)
}

fn site_chart(preset: &Preset, table: &ImbalanceTable, site: &SiteId, reference_ms: i64) -> ChartData {
    let mut series_list = vec![
        series(
            "site-scheduled",
            "Scheduled",
            Some("blue"),
            SeriesStyle::Solid,
            table.site_column(site, |r| r.scheduled),
        ),
        series(
            "site-actual",
            "Actual",
            Some("red"),
            SeriesStyle::Dotted,
            table.site_column(site, |r| r.actual),
        ),
        series(
            "site-imbalance",
            "Imbalance",
            Some("orange"),
            SeriesStyle::Bar,
            table.site_column(site, SiteReading::imbalance),
        ),
    ];

    if let Some(floor) = preset.min_flex_mw {
        series_list.push(series(
            "min-flex",
            "Min Flex",
            Some("grey"),
            SeriesStyle::Dotted,
            table.column(|_| floor),
        ));
    }

    ChartData::new(
        "site-imbalance",
        &format!("{site} Imbalance and Flexibility"),
        Some("MW"),
        ChartKind::Combo,
        series_list,
    )
    .with_marker(reference_ms)
}

fn market_tab(table: &ImbalanceTable, reference_ms: i64) -> DashboardTab {
    let schedules: Vec<SeriesData> = table
        .sites
        .iter()
        .map(|site| {
            series(
                &format!("scheduled-{}", slug(site)),
                &format!("Scheduled {site}"),
                None,
                SeriesStyle::Solid,
                table.site_column(site, |r| r.scheduled),
            )
        })
        .collect();

    let mut charts = Vec::new();
    if !schedules.is_empty() {
        charts.push(
            ChartData::new(
                "site-schedules",
                "Day-Ahead Schedules",
                Some("MW"),
                ChartKind::MultiLine,
                schedules,
            )
            .with_marker(reference_ms),
        );
    }

    charts.push(
        ChartData::new(
            "market",
            "Imbalance Price and mFRR Activations",
            None,
            ChartKind::Combo,
            vec![
                series(
                    "imbalance-price",
                    "Imbalance Price (€/MWh)",
                    Some("purple"),
                    SeriesStyle::Solid,
                    table.column(|r| r.market().imbalance_price),
                ),
                series(
                    "balancing-activations",
                    "Activations (MWh)",
                    Some("green"),
                    SeriesStyle::Bar,
                    table.column(|r| r.market().balancing_activations),
                ),
            ],
        )
        .with_marker(reference_ms),
    );

    let tiles = vec![TileData::new(
        "imbalance-cost",
        "Imbalance Cost",
        "€",
        table.total_cost(),
        0,
    )];

    DashboardTab::new("market", "Market & Schedule", tiles, charts)
}

fn series(
    id: &str,
    name: &str,
    color: Option<&str>,
    style: SeriesStyle,
    column: Vec<(DateTime<Utc>, f64)>,
) -> SeriesData {
    let points: Vec<TimeSeriesPoint> = column
        .into_iter()
        .map(|(t, v)| TimeSeriesPoint::new(t.timestamp_millis(), v))
        .collect();
    SeriesData::new(
        id.to_string(),
        name.to_string(),
        color,
        style,
        downsample_points(points, MAX_POINTS_PER_SERIES),
    )
}

fn slug(site: &SiteId) -> String {
    site.as_str().to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::series_generator::{GenerationRequest, SeriesGenerator};
    use crate::domain::thresholds::{Bounds, Thresholds};
    use crate::infrastructure::mock_repository::MockImbalanceRepository;
    use crate::domain::preset::PresetCatalog;
    use crate::domain::site::SiteSelection;
    use crate::infrastructure::rng_source::RngSource;
    use chrono::{TimeDelta, TimeZone};

    fn table(preset: &Preset, sites: &[&str]) -> ImbalanceTable {
        let request = GenerationRequest::from_preset(
            preset,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            sites.iter().map(|s| SiteId::from(*s)).collect(),
            preset.thresholds,
        );
        SeriesGenerator::generate(&request, &mut RngSource::seeded(21)).unwrap()
    }

    #[test]
    fn tiles_match_table_summaries() {
        let preset = Preset::portfolio_flex();
        let table = table(&preset, &["Site A", "Site B"]);
        let dashboard = build_dashboard(&preset, &table, DashboardOptions::default());

        let counts = table.alert_counts();
        assert_eq!(dashboard.tile("alerts-volume").unwrap().value, counts.volume as f64);
        assert_eq!(dashboard.tile("alerts-price").unwrap().value, counts.price as f64);
        assert_eq!(dashboard.tile("alerts-cost").unwrap().value, counts.cost as f64);
        assert_eq!(
            dashboard.tile("activations-count").unwrap().value,
            table.activation_count() as f64
        );
        assert_eq!(
            dashboard.tile("activations-energy").unwrap().value,
            table.activation_energy_mwh()
        );
        assert_eq!(dashboard.tile("avg-price").unwrap().value, table.mean_price().unwrap());
        assert_eq!(dashboard.tile("imbalance-cost").unwrap().value, table.total_cost());
        assert_eq!(dashboard.tabs.len(), 3);
    }

    #[test]
    fn disabled_alert_kinds_have_no_tiles() {
        let preset = Preset::imbalance_monitor();
        let table = table(&preset, &["Site A"]);
        let dashboard = build_dashboard(&preset, &table, DashboardOptions::default());
        assert!(dashboard.tile("alerts-volume").is_some());
        assert!(dashboard.tile("alerts-price").is_none());
        assert!(dashboard.tile("alerts-cost").is_none());

        let hidden = build_dashboard(&preset, &table, DashboardOptions { show_alerts: false });
        assert!(hidden.tile("alerts-volume").is_none());
    }

    #[test]
    fn site_chart_follows_first_selected_site() {
        let preset = Preset::portfolio_flex();
        let table = table(&preset, &["Site C", "Site A"]);
        let dashboard = build_dashboard(&preset, &table, DashboardOptions::default());

        let chart = dashboard.chart("site-imbalance").unwrap();
        assert_eq!(chart.title, "Site C Imbalance and Flexibility");
        let ids: Vec<&str> = chart.series.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["site-scheduled", "site-actual", "site-imbalance", "min-flex"]);
        assert!(chart.series[3].points.iter().all(|p| p.value == 35.0));

        let site_c = SiteId::from("Site C");
        let expected: Vec<f64> = table.rows.iter().map(|r| r.site(&site_c).unwrap().imbalance()).collect();
        let plotted: Vec<f64> = chart.series[2].points.iter().map(|p| p.value).collect();
        assert_eq!(plotted, expected);

        let schedules = dashboard.chart("site-schedules").unwrap();
        assert_eq!(schedules.series.len(), 2);
        assert_eq!(schedules.series[0].id, "scheduled-site-c");
    }

    #[test]
    fn empty_selection_still_renders_portfolio() {
        let preset = Preset::intraday();
        let table = table(&preset, &[]);
        let dashboard = build_dashboard(&preset, &table, DashboardOptions::default());

        assert!(dashboard.chart("site-imbalance").is_none());
        assert!(dashboard.chart("site-schedules").is_none());
        let portfolio = dashboard.chart("portfolio-consumption").unwrap();
        assert!(portfolio.series[0].points.iter().all(|p| p.value == 0.0));
        assert_eq!(dashboard.tile("imbalance-cost").unwrap().value, 0.0);
    }

    #[test]
    fn long_windows_are_downsampled() {
        let mut preset = Preset::intraday();
        preset.window_before_minutes = 3 * 24 * 60;
        preset.window_after_minutes = 0;
        let table = table(&preset, &["Site A"]);
        assert_eq!(table.row_count(), 3 * 24 * 4 + 1);
        assert_eq!(table.reference_time - table.rows[0].timestamp, TimeDelta::days(3));

        let dashboard = build_dashboard(&preset, &table, DashboardOptions::default());
        let chart = dashboard.chart("portfolio-consumption").unwrap();
        assert!(chart.series[0].points.len() <= MAX_POINTS_PER_SERIES);
    }

    #[tokio::test]
    async fn service_uses_query_thresholds() {
        let repository = Arc::new(MockImbalanceRepository::new(PresetCatalog::builtin().unwrap(), Some(4)));
        let service = DashboardService::new(repository);
        let query = TableQuery {
            preset: "imbalance-monitor".to_string(),
            reference_time: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            selection: SiteSelection::All,
            thresholds: Some(Thresholds {
                volume: Bounds::symmetric(0.0),
                price: Bounds::unbounded(),
                cost: Bounds::unbounded(),
            }),
            seed: None,
        };
        let dashboard = service.get_dashboard(&query, DashboardOptions::default()).await.unwrap();
        assert_eq!(dashboard.preset, "imbalance-monitor");
        // Continuous draws are never exactly zero
        assert_eq!(dashboard.tile("alerts-volume").unwrap().value, 65.0);
    }
}
