//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::error::AnalyticsError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Internal server error
    Internal(String),
    /// Store error outside of an engine call
    Repository(RepositoryError),
    /// Engine error
    Analytics(AnalyticsError),
}

fn repository_response(e: RepositoryError) -> (StatusCode, ApiError) {
    let (status, code) = if e.is_timeout() {
        (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT")
    } else if e.is_not_found() {
        (StatusCode::NOT_FOUND, "NOT_FOUND")
    } else if matches!(e, RepositoryError::ValidationError { .. }) {
        (StatusCode::BAD_REQUEST, "BAD_REQUEST")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
    };
    let mut error = ApiError::new(code, e.to_string());
    if e.context().operation.is_some() {
        error = error.with_details(e.context().to_string());
    }
    (status, error)
}

fn analytics_response(e: AnalyticsError) -> (StatusCode, ApiError) {
    match e {
        AnalyticsError::StoreQuery(inner) if inner.is_timeout() => repository_response(inner),
        AnalyticsError::StoreQuery(inner) => {
            let (status, error) = repository_response(inner);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                (status, ApiError { code: "STORE_QUERY_ERROR".to_string(), ..error })
            } else {
                (status, error)
            }
        }
        e @ AnalyticsError::MeasurementNotFound { .. } => (
            StatusCode::NOT_FOUND,
            ApiError::new("MEASUREMENT_NOT_FOUND", e.to_string()),
        ),
        e @ (AnalyticsError::BoxNotFound(_) | AnalyticsError::SensorNotFound { .. }) => {
            (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", e.to_string()))
        }
        e @ (AnalyticsError::InvalidRange(_)
        | AnalyticsError::Range(_)
        | AnalyticsError::InvalidBounds(_)
        | AnalyticsError::InvalidFilter(_)
        | AnalyticsError::InvalidValue(_)) => {
            (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", e.to_string()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => repository_response(e),
            AppError::Analytics(e) => analytics_response(e),
        };

        if status.is_server_error() {
            tracing::warn!("{} {}: {}", status.as_u16(), error.code, error.message);
        }
        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        AppError::Analytics(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization failed: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
