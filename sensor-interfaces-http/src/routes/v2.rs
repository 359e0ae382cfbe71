use axum::Router;

use sensor_application::AppState;

use crate::handlers::{analyze_handlers, ops_handlers, page_handlers, report_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", axum::routing::get(page_handlers::dashboard_page))
        .route(
            "/v2/analyze",
            axum::routing::post(analyze_handlers::analyze_upload),
        )
        .route(
            "/v2/reports/:id",
            axum::routing::get(report_handlers::download_report),
        )
        .route(
            "/v2/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v2/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v2/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
