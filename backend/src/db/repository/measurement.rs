//! Measurement repository trait: the query surface the analytic engines consume.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Aggregate, Measurement, SampleFilter, SensorId, TimeRange};

/// Repository trait for time-series measurement operations.
///
/// Measurements are append-only: there is no update or delete.
///
/// # Consistency
/// Each call reads whatever the store holds at that moment. Several calls
/// made for one request (a total count followed by per-bucket aggregations)
/// are not isolated from concurrent writes.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Fetch the measurements of a sensor taken within `range`.
    ///
    /// # Arguments
    /// * `sensor_id` - The sensor to query
    /// * `range` - Inclusive time range on `created_at`
    /// * `limit` - Maximum number of rows to return
    ///
    /// # Returns
    /// * `Ok(Vec<Measurement>)` - At most `limit` rows, ascending by `created_at`
    /// * `Err(RepositoryError)` - If the query fails
    async fn find_in_range(
        &self,
        sensor_id: SensorId,
        range: TimeRange,
        limit: usize,
    ) -> RepositoryResult<Vec<Measurement>>;

    /// Count the measurements of a sensor matching `filter`.
    async fn count_where(&self, sensor_id: SensorId, filter: &SampleFilter)
        -> RepositoryResult<u64>;

    /// Count the measurements of a sensor matching `filter` and return their raw values.
    ///
    /// # Returns
    /// * `Ok(Aggregate)` - Match count plus the matching values in store order
    /// * `Err(RepositoryError)` - If the query fails
    async fn aggregate_where(
        &self,
        sensor_id: SensorId,
        filter: &SampleFilter,
    ) -> RepositoryResult<Aggregate>;

    /// Append a measurement.
    async fn store_measurement(&self, measurement: Measurement) -> RepositoryResult<Measurement>;

    /// Look up a single measurement by its ID.
    async fn get_measurement(
        &self,
        measurement_id: crate::api::MeasurementId,
    ) -> RepositoryResult<Option<Measurement>>;
}
