//! Public API surface for the Rust backend.
//!
//! This file consolidates the DTO types for the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::conditions::BucketStat;
pub use crate::routes::conditions::DistributionResult;
pub use crate::routes::data::MeasurementPoint;
pub use crate::routes::sensors::SensorReading;
pub use crate::routes::sensors::SensorsOverview;

pub use crate::models::{
    Aggregate, HourSpan, Measurement, MonthSpan, SampleFilter, SeasonalWindow, SenseBox, Sensor,
    TimeRange, ValuePredicate,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new(value: Uuid) -> Self {
                $name(value)
            }

            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                $name(Uuid::new_v4())
            }

            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map($name)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                $name(value)
            }
        }
    };
}

uuid_id!(
    /// Box identifier (one physical sensing device).
    BoxId
);

uuid_id!(
    /// Sensor identifier (one measured quantity on a box).
    SensorId
);

uuid_id!(
    /// Measurement identifier.
    MeasurementId
);

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
