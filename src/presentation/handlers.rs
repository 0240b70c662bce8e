// HTTP request handlers
use crate::application::dashboard_service::DashboardOptions;
use crate::application::imbalance_repository::{RepositoryError, TableQuery};
use crate::domain::preset::PresetError;
use crate::domain::site::SiteSelection;
use crate::domain::thresholds::Thresholds;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, error_response, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Control values a dashboard request may carry
#[derive(Debug, Default, Deserialize)]
pub struct ControlParams {
    pub at: Option<DateTime<Utc>>,
    pub sites: Option<String>,
    pub volume_low: Option<f64>,
    pub volume_high: Option<f64>,
    pub price_low: Option<f64>,
    pub price_high: Option<f64>,
    pub cost_low: Option<f64>,
    pub cost_high: Option<f64>,
    pub seed: Option<u64>,
    pub alerts: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PresetSummary {
    pub name: String,
    pub title: String,
    pub window_before_minutes: i64,
    pub window_after_minutes: i64,
    pub period_minutes: i64,
    pub sites: usize,
    pub default: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List configured presets
pub async fn list_presets(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let presets: Vec<PresetSummary> = state
        .repository
        .presets()
        .into_iter()
        .map(|p| PresetSummary {
            default: p.name == state.settings.default_preset,
            sites: p.sites.len(),
            window_before_minutes: p.window_before_minutes,
            window_after_minutes: p.window_after_minutes,
            period_minutes: p.period_minutes,
            title: p.title,
            name: p.name,
        })
        .collect();

    respond(json_response(&presets, accepts_brotli(&headers)).await)
}

/// List the sites of a preset
pub async fn list_sites(
    Path(preset): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    match state.site_service.list_sites(&preset).await {
        Ok(sites) => respond(json_response(&sites, accepts_brotli(&headers)).await),
        Err(e) => repository_error(e),
    }
}

/// Generated table for a preset
pub async fn get_table(
    Path(preset): Path<String>,
    Query(params): Query<ControlParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let query = match table_query(&state, preset, &params) {
        Ok(query) => query,
        Err(e) => return repository_error(e),
    };

    match state.repository.load_table(&query).await {
        Ok(table) => respond(json_response(&table, accepts_brotli(&headers)).await),
        Err(e) => repository_error(e),
    }
}

/// Full dashboard for a preset
pub async fn get_dashboard(
    Path(preset): Path<String>,
    Query(params): Query<ControlParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let query = match table_query(&state, preset, &params) {
        Ok(query) => query,
        Err(e) => return repository_error(e),
    };

    match state
        .dashboard_service
        .get_dashboard(&query, options(&state, &params))
        .await
    {
        Ok(dashboard) => respond(json_response(&dashboard, accepts_brotli(&headers)).await),
        Err(e) => repository_error(e),
    }
}

/// Full dashboard for the configured default preset
pub async fn get_default_dashboard(
    query: Query<ControlParams>,
    headers: HeaderMap,
    state: State<Arc<AppState>>,
) -> Response<Body> {
    let preset = state.settings.default_preset.clone();
    get_dashboard(Path(preset), query, headers, state).await
}

/// Stream dashboard for a preset (progressive loading)
pub async fn stream_dashboard(
    Path(preset): Path<String>,
    Query(params): Query<ControlParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let query = match table_query(&state, preset, &params) {
        Ok(query) => query,
        Err(e) => return repository_error(e),
    };

    match state
        .streaming_service
        .stream_dashboard(&query, options(&state, &params))
        .await
    {
        Ok(rx) => stream_from_receiver(rx, accepts_brotli(&headers))
            .await
            .into_response(),
        Err(e) => repository_error(e),
    }
}

/// Resolve request controls against the preset defaults.
fn table_query(
    state: &AppState,
    preset: String,
    params: &ControlParams,
) -> Result<TableQuery, RepositoryError> {
    let defaults = state.repository.preset(&preset)?.thresholds;
    let thresholds = Thresholds {
        volume: defaults.volume.with_overrides(params.volume_low, params.volume_high),
        price: defaults.price.with_overrides(params.price_low, params.price_high),
        cost: defaults.cost.with_overrides(params.cost_low, params.cost_high),
    };

    let reference_time = params.at.unwrap_or_else(|| {
        Utc::now() + TimeDelta::minutes(i64::from(state.settings.utc_offset_minutes))
    });

    let selection = params
        .sites
        .as_deref()
        .map(SiteSelection::parse)
        .unwrap_or_default();

    Ok(TableQuery {
        preset,
        reference_time,
        selection,
        thresholds: Some(thresholds),
        seed: params.seed,
    })
}

fn options(state: &AppState, params: &ControlParams) -> DashboardOptions {
    DashboardOptions {
        show_alerts: params.alerts.unwrap_or(state.settings.show_alerts),
    }
}

fn respond(result: Result<Response<Body>, StatusCode>) -> Response<Body> {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

fn repository_error(error: RepositoryError) -> Response<Body> {
    let status = match &error {
        RepositoryError::Preset(PresetError::Unknown(_)) => StatusCode::NOT_FOUND,
        RepositoryError::Preset(PresetError::Invalid { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        RepositoryError::Selection(_)
        | RepositoryError::Thresholds(_)
        | RepositoryError::Generate(_) => StatusCode::BAD_REQUEST,
    };
    tracing::warn!("Rejected request ({}): {}", status, error);
    error_response(status, error.to_string())
}
