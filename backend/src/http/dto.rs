//! Data Transfer Objects for the HTTP API.
//!
//! Response bodies are re-exported from the routes module since they
//! already derive Serialize/Deserialize. The types defined here only
//! describe query strings and request bodies.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    BucketStat, DistributionResult, Measurement, MeasurementPoint, SensorReading, SensorsOverview,
};

/// Query parameters of the data endpoint.
///
/// Values stay raw strings so that an unparseable date is reported as an
/// invalid time range rather than a generic query rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataQuery {
    /// Start of the window (default: `to-date` minus the configured lookback)
    #[serde(rename = "from-date", default)]
    pub from_date: Option<String>,
    /// End of the window (default: now)
    #[serde(rename = "to-date", default)]
    pub to_date: Option<String>,
    /// `json` (default) or `csv`
    #[serde(default)]
    pub format: Option<String>,
    /// `true` to receive the payload as a file attachment
    #[serde(default)]
    pub download: Option<String>,
}

/// Query parameters of the conditions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConditionsQuery {
    /// Month span such as `4-9` or `10-2`
    #[serde(default)]
    pub months: Option<String>,
    /// Hour span such as `8-16` or `22-6`
    #[serde(default)]
    pub hours: Option<String>,
}

/// Request body for posting a new measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMeasurementRequest {
    /// Decimal number as text, e.g. `"21.5"`
    pub value: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Store connection status
    pub database: String,
}
