// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_dashboard, get_default_dashboard, get_table, health_check, list_presets, list_sites,
    stream_dashboard,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Compression is handled per response, so no CompressionLayer here
    Router::new()
        .route("/healthz", get(health_check))
        .route("/presets", get(list_presets))
        .route("/presets/:preset/sites", get(list_sites))
        .route("/presets/:preset/table", get(get_table))
        .route("/presets/:preset/dashboard", get(get_dashboard))
        .route("/presets/:preset/dashboard/stream", get(stream_dashboard))
        .route("/dashboard", get(get_default_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
