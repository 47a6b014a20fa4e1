use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{BoxId, MeasurementId, SensorId};

/// One timestamped reading from a sensor.
///
/// The value is kept exactly as the device sent it (a decimal string).
/// Measurements are immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: MeasurementId,
    pub sensor_id: SensorId,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

impl Measurement {
    /// Create a new measurement with a fresh identifier.
    pub fn new(sensor_id: SensorId, value: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: MeasurementId::generate(),
            sensor_id,
            value: value.into(),
            created_at,
        }
    }

    /// Numeric interpretation of the stored value.
    ///
    /// `None` for values that are not finite decimal numbers; such values
    /// never satisfy a value predicate.
    pub fn numeric_value(&self) -> Option<f64> {
        parse_decimal(&self.value)
    }
}

/// Parse a decimal-as-string value.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A single measured quantity on a box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: SensorId,
    pub title: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,
    #[serde(default)]
    pub last_measurement: Option<MeasurementId>,
}

impl Sensor {
    pub fn new(title: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: SensorId::generate(),
            title: title.into().trim().to_string(),
            unit: unit.into().trim().to_string(),
            sensor_type: None,
            last_measurement: None,
        }
    }

    pub fn with_sensor_type(mut self, sensor_type: impl Into<String>) -> Self {
        self.sensor_type = Some(sensor_type.into().trim().to_string());
        self
    }
}

/// A physical sensing device with its sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenseBox {
    pub id: BoxId,
    pub name: String,
    pub box_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouptag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl SenseBox {
    pub fn new(name: impl Into<String>, box_type: impl Into<String>) -> Self {
        Self {
            id: BoxId::generate(),
            name: name.into().trim().to_string(),
            box_type: box_type.into(),
            exposure: None,
            grouptag: None,
            model: None,
            sensors: Vec::new(),
        }
    }

    pub fn with_sensor(mut self, sensor: Sensor) -> Self {
        self.sensors.push(sensor);
        self
    }

    /// First sensor whose title equals `title` exactly.
    pub fn find_sensor_by_title(&self, title: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.title == title)
    }

    pub fn sensor(&self, sensor_id: SensorId) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.id == sensor_id)
    }
}

/// Result of an aggregation query: how many samples matched and their raw values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub count: u64,
    pub values: Vec<String>,
}
