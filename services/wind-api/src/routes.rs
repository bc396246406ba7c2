//! Router assembly.

use axum::{routing::get, Extension, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the service router. Unmatched paths are served from `static_dir`
/// when one is given.
pub fn build_router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        // Wind data
        .route("/ocean-wind-data", get(handlers::wind::ocean_wind_handler))
        .route("/test-wind-data", get(handlers::wind::test_wind_handler))
        .route("/nws/forecast/windgrid", get(handlers::wind::windgrid_handler))
        // Legend
        .route("/legend.svg", get(handlers::legend::legend_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
