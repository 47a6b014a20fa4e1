//! Box repository trait.
//!
//! Box management is owned elsewhere; the analytic core only needs to read a
//! box's sensor list and record a sensor's latest measurement.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{BoxId, MeasurementId, SenseBox, SensorId};

/// Repository trait for box lookups.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait BoxRepository: Send + Sync {
    /// Check if the store connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Retrieve a box with its sensors.
    ///
    /// # Returns
    /// * `Ok(SenseBox)` - The box
    /// * `Err(RepositoryError::NotFound)` - If the box doesn't exist
    async fn get_box(&self, box_id: BoxId) -> RepositoryResult<SenseBox>;

    /// Store a box, replacing any box with the same ID.
    async fn store_box(&self, sensebox: SenseBox) -> RepositoryResult<BoxId>;

    /// Point a sensor at its most recent measurement.
    async fn set_last_measurement(
        &self,
        box_id: BoxId,
        sensor_id: SensorId,
        measurement_id: MeasurementId,
    ) -> RepositoryResult<()>;
}
