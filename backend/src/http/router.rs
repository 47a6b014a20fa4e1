//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Devices and dashboards post from arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let boxes = Router::new()
        .route("/{box_id}/sensors", get(handlers::get_sensors))
        .route("/{box_id}/{sensor_id}", post(handlers::post_measurement))
        .route("/{box_id}/data/{sensor_id}", get(handlers::get_data))
        .route(
            "/{box_id}/conditions/{measurement}/{bounds}",
            get(handlers::get_conditions),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/boxes", boxes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
