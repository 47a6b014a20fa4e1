//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer. Engine calls run under the configured query timeout.

use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use super::dto::{
    ConditionsQuery, DataQuery, DistributionResult, HealthResponse, Measurement,
    PostMeasurementRequest, SensorsOverview,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{BoxId, SensorId};
use crate::db::repository::{ErrorContext, RepositoryError};
use crate::db::services as db_services;
use crate::services::{distributions, export, measurements};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Run a store-backed call, turning an elapsed deadline into a store timeout.
async fn with_timeout<T, E, F>(limit: Duration, operation: &str, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<AppError>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            tracing::warn!("{} did not finish within {:?}", operation, limit);
            Err(RepositoryError::timeout(
                format!("{} did not finish in time", operation),
                ErrorContext::new(operation).with_details(format!("limit={}s", limit.as_secs())),
            )
            .into())
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Measurements
// =============================================================================

/// GET /boxes/{box_id}/sensors
///
/// All sensors of a box with their latest measurement.
pub async fn get_sensors(
    State(state): State<AppState>,
    Path(box_id): Path<BoxId>,
) -> HandlerResult<SensorsOverview> {
    let overview = with_timeout(
        state.query_timeout(),
        "get_sensors",
        db_services::latest_measurements(state.repository.as_ref(), box_id),
    )
    .await?;
    Ok(Json(overview))
}

/// POST /boxes/{box_id}/{sensor_id}
///
/// Store a new reading for a sensor.
pub async fn post_measurement(
    State(state): State<AppState>,
    Path((box_id, sensor_id)): Path<(BoxId, SensorId)>,
    Json(request): Json<PostMeasurementRequest>,
) -> Result<(StatusCode, Json<Measurement>), AppError> {
    let stored = with_timeout(
        state.query_timeout(),
        "post_measurement",
        measurements::record_measurement(
            state.repository.as_ref(),
            box_id,
            sensor_id,
            &request.value,
            Utc::now(),
        ),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /boxes/{box_id}/data/{sensor_id}
///
/// Up to `result_limit` points of a sensor inside the requested window,
/// as JSON or CSV.
pub async fn get_data(
    State(state): State<AppState>,
    Path((box_id, sensor_id)): Path<(BoxId, SensorId)>,
    Query(query): Query<DataQuery>,
) -> Result<Response, AppError> {
    let range = measurements::resolve_time_range(
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        Utc::now(),
        &state.config.limits,
    )?;
    tracing::debug!(
        "get_data box={} sensor={} from={} to={}",
        box_id,
        sensor_id,
        range.from(),
        range.to()
    );

    let points = with_timeout(
        state.query_timeout(),
        "get_data",
        measurements::get_data(state.repository.as_ref(), sensor_id, range, &state.sampler),
    )
    .await?;

    let format = export::ExportFormat::from_param(query.format.as_deref());
    let download = export::download_requested(query.download.as_deref());
    let rendered = export::render(&points, format, sensor_id, download)?;

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, rendered.content_type)],
        rendered.body,
    )
        .into_response();
    if let Some(disposition) = rendered.disposition {
        let value = HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// GET /boxes/{box_id}/conditions/{measurement}/{bounds}
///
/// Distribution of a measurement's values over the given bucket bounds,
/// optionally restricted to `months` and `hours`.
pub async fn get_conditions(
    State(state): State<AppState>,
    Path((box_id, measurement, bounds)): Path<(BoxId, String, String)>,
    Query(query): Query<ConditionsQuery>,
) -> HandlerResult<DistributionResult> {
    let boundaries = distributions::parse_bounds(&bounds)?;
    let window = distributions::parse_window(query.months.as_deref(), query.hours.as_deref())?;

    let result = with_timeout(
        state.query_timeout(),
        "get_conditions",
        distributions::get_conditions(
            state.repository.as_ref(),
            box_id,
            &measurement,
            &boundaries,
            window,
            state.bucket_evaluation(),
        ),
    )
    .await?;

    Ok(Json(result))
}
