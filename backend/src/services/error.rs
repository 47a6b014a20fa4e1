//! Errors raised by the analytic engines.

use crate::api::{BoxId, SensorId};
use crate::db::repository::RepositoryError;

/// Result type for engine operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Error type for the downsampling and distribution engines.
///
/// Every error is local to one request. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// The requested time window is inverted, too wide, or unparseable.
    /// Raised before any store query is issued.
    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    /// Sampling limits are inconsistent (`result_limit == 0` or
    /// `query_limit < result_limit`), or a day-based limit is out of range.
    #[error("Range error: {0}")]
    Range(String),

    /// The measurement store failed. Partial results are discarded.
    #[error("Store query failed: {0}")]
    StoreQuery(#[from] RepositoryError),

    /// No sensor of the box carries the requested measurement title.
    #[error("no such measurement found")]
    MeasurementNotFound { box_id: BoxId, measurement: String },

    #[error("Box {0} not found")]
    BoxNotFound(BoxId),

    #[error("Sensor {sensor_id} not found on box {box_id}")]
    SensorNotFound { box_id: BoxId, sensor_id: SensorId },

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid measurement value: {0}")]
    InvalidValue(String),
}

impl AnalyticsError {
    /// True for errors caused by the request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AnalyticsError::StoreQuery(_))
    }

    /// Turn a store error from a box lookup into `BoxNotFound` when it is one.
    pub fn from_box_lookup(box_id: BoxId, err: RepositoryError) -> Self {
        if err.is_not_found() {
            AnalyticsError::BoxNotFound(box_id)
        } else {
            AnalyticsError::StoreQuery(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::ErrorContext;

    #[test]
    fn test_measurement_not_found_message() {
        let err = AnalyticsError::MeasurementNotFound {
            box_id: BoxId::generate(),
            measurement: "Light".to_string(),
        };
        assert_eq!(err.to_string(), "no such measurement found");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_store_errors_are_not_client_errors() {
        let err: AnalyticsError = RepositoryError::internal("boom").into();
        assert!(matches!(err, AnalyticsError::StoreQuery(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_box_lookup_mapping() {
        let id = BoxId::generate();
        let not_found = RepositoryError::not_found("gone", ErrorContext::new("get_box"));
        assert!(matches!(
            AnalyticsError::from_box_lookup(id, not_found),
            AnalyticsError::BoxNotFound(b) if b == id
        ));

        let down = RepositoryError::connection("down", ErrorContext::new("get_box"));
        assert!(matches!(
            AnalyticsError::from_box_lookup(id, down),
            AnalyticsError::StoreQuery(_)
        ));
    }
}
