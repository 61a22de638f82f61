//! Route definitions

use axum::{Router, routing::get};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // NEA proxies (v1)
        .route(
            "/v1/weather/two-hour-forecast",
            get(handlers::weather::two_hour_forecast),
        )
        .route(
            "/v1/weather/stations/{metric}",
            get(handlers::weather::station_readings),
        )
        .route("/v1/weather/lightning", get(handlers::weather::lightning))
        .route("/v1/weather/wbgt", get(handlers::weather::wbgt))
        // Area lookups (v1)
        .route("/v1/weather/areas", get(handlers::weather::areas))
        .route("/v1/weather/forecast", get(handlers::weather::area_forecast))
        .route(
            "/v1/weather/forecast/nearest",
            get(handlers::weather::nearest_forecast),
        )
        // Dashboard hub (v1)
        .route("/v1/weather/dashboard", get(handlers::dashboard::dashboard))
        .with_state(state)
}
