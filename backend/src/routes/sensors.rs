use serde::{Deserialize, Serialize};

use crate::api::{BoxId, Measurement, SensorId};

/// A sensor with its most recent measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub id: SensorId,
    pub title: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,
    pub last_measurement: Option<Measurement>,
}

/// All sensors of one box with their latest values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorsOverview {
    pub box_id: BoxId,
    pub sensors: Vec<SensorReading>,
}

pub const GET_LATEST_MEASUREMENTS: &str = "get_latest_measurements";
