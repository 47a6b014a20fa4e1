use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::Measurement;

/// One point of a sensor's time series as returned to clients.
///
/// Only `createdAt` and `value` leave the backend; IDs are stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPoint {
    pub created_at: DateTime<Utc>,
    pub value: String,
}

impl From<Measurement> for MeasurementPoint {
    fn from(m: Measurement) -> Self {
        Self {
            created_at: m.created_at,
            value: m.value,
        }
    }
}

pub const GET_DATA: &str = "get_data";
pub const POST_MEASUREMENT: &str = "post_measurement";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SensorId;
    use chrono::TimeZone;

    #[test]
    fn test_point_from_measurement_drops_ids() {
        let at = Utc.with_ymd_and_hms(2016, 3, 1, 12, 0, 0).unwrap();
        let point = MeasurementPoint::from(Measurement::new(SensorId::generate(), "3.14", at));
        let json = serde_json::to_value(&point).unwrap();

        assert_eq!(json["value"], "3.14");
        assert_eq!(json["createdAt"], "2016-03-01T12:00:00Z");
        assert!(json.get("id").is_none());
        assert!(json.get("sensorId").is_none());
    }

    #[test]
    fn test_const_values() {
        assert_eq!(GET_DATA, "get_data");
        assert_eq!(POST_MEASUREMENT, "post_measurement");
    }
}
