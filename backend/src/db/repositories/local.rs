//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory, providing fast, deterministic, and isolated execution.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{
    Aggregate, BoxId, Measurement, MeasurementId, SampleFilter, SenseBox, SensorId, TimeRange,
};
use crate::db::repository::*;

/// In-memory local repository.
///
/// Each sensor's series is kept sorted by `created_at`, so range queries
/// come back in ascending time order just like an indexed store would
/// return them.
///
/// # Example
/// ```
/// use osem_rust::db::repositories::LocalRepository;
/// use osem_rust::db::repository::MeasurementRepository;
/// use osem_rust::api::{Measurement, SampleFilter, SensorId};
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// let sensor = SensorId::generate();
/// repo.store_measurement(Measurement::new(sensor, "21.5", chrono::Utc::now()))
///     .await
///     .unwrap();
/// assert_eq!(repo.count_where(sensor, &SampleFilter::all()).await.unwrap(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    boxes: HashMap<BoxId, SenseBox>,
    series: HashMap<SensorId, Vec<Measurement>>,
    measurement_index: HashMap<MeasurementId, SensorId>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            boxes: HashMap::new(),
            series: HashMap::new(),
            measurement_index: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    ///
    /// While unhealthy, every query fails with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Number of measurements stored for a sensor.
    pub fn measurement_count(&self, sensor_id: SensorId) -> usize {
        self.data
            .read()
            .series
            .get(&sensor_id)
            .map_or(0, |s| s.len())
    }

    /// Bulk-load measurements without going through the async trait.
    pub fn insert_measurements(&self, measurements: impl IntoIterator<Item = Measurement>) {
        let mut data = self.data.write();
        for m in measurements {
            insert_sorted(&mut data, m);
        }
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection(
                "Store is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert after every measurement with the same or an earlier timestamp,
/// so equal timestamps keep arrival order.
fn insert_sorted(data: &mut LocalData, measurement: Measurement) {
    data.measurement_index
        .insert(measurement.id, measurement.sensor_id);
    let series = data.series.entry(measurement.sensor_id).or_default();
    let at = series.partition_point(|m| m.created_at <= measurement.created_at);
    series.insert(at, measurement);
}

#[async_trait]
impl MeasurementRepository for LocalRepository {
    async fn find_in_range(
        &self,
        sensor_id: SensorId,
        range: TimeRange,
        limit: usize,
    ) -> RepositoryResult<Vec<Measurement>> {
        self.check_health("find_in_range")?;
        let data = self.data.read();
        let Some(series) = data.series.get(&sensor_id) else {
            return Ok(Vec::new());
        };

        let start = series.partition_point(|m| m.created_at < range.from());
        Ok(series[start..]
            .iter()
            .take_while(|m| m.created_at <= range.to())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_where(
        &self,
        sensor_id: SensorId,
        filter: &SampleFilter,
    ) -> RepositoryResult<u64> {
        self.check_health("count_where")?;
        let data = self.data.read();
        let count = data
            .series
            .get(&sensor_id)
            .map_or(0, |s| s.iter().filter(|m| filter.matches(m)).count());
        Ok(count as u64)
    }

    async fn aggregate_where(
        &self,
        sensor_id: SensorId,
        filter: &SampleFilter,
    ) -> RepositoryResult<Aggregate> {
        self.check_health("aggregate_where")?;
        let data = self.data.read();
        let values: Vec<String> = data
            .series
            .get(&sensor_id)
            .map(|s| {
                s.iter()
                    .filter(|m| filter.matches(m))
                    .map(|m| m.value.clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Aggregate {
            count: values.len() as u64,
            values,
        })
    }

    async fn store_measurement(&self, measurement: Measurement) -> RepositoryResult<Measurement> {
        self.check_health("store_measurement")?;
        let mut data = self.data.write();
        if data.measurement_index.contains_key(&measurement.id) {
            return Err(RepositoryError::validation(
                "Measurement already exists",
                ErrorContext::new("store_measurement")
                    .with_entity("measurement")
                    .with_entity_id(measurement.id),
            ));
        }
        insert_sorted(&mut data, measurement.clone());
        Ok(measurement)
    }

    async fn get_measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> RepositoryResult<Option<Measurement>> {
        self.check_health("get_measurement")?;
        let data = self.data.read();
        let found = data
            .measurement_index
            .get(&measurement_id)
            .and_then(|sensor_id| data.series.get(sensor_id))
            .and_then(|s| s.iter().find(|m| m.id == measurement_id))
            .cloned();
        Ok(found)
    }
}

#[async_trait]
impl BoxRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn get_box(&self, box_id: BoxId) -> RepositoryResult<SenseBox> {
        self.check_health("get_box")?;
        self.data.read().boxes.get(&box_id).cloned().ok_or_else(|| {
            RepositoryError::not_found(
                format!("Box {} not found", box_id),
                ErrorContext::new("get_box")
                    .with_entity("box")
                    .with_entity_id(box_id),
            )
        })
    }

    async fn store_box(&self, sensebox: SenseBox) -> RepositoryResult<BoxId> {
        self.check_health("store_box")?;
        let id = sensebox.id;
        self.data.write().boxes.insert(id, sensebox);
        Ok(id)
    }

    async fn set_last_measurement(
        &self,
        box_id: BoxId,
        sensor_id: SensorId,
        measurement_id: MeasurementId,
    ) -> RepositoryResult<()> {
        self.check_health("set_last_measurement")?;
        let mut data = self.data.write();
        let context = || {
            ErrorContext::new("set_last_measurement")
                .with_entity("sensor")
                .with_entity_id(sensor_id)
        };
        let sensebox = data.boxes.get_mut(&box_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Box {} not found", box_id), context())
        })?;
        let sensor = sensebox
            .sensors
            .iter_mut()
            .find(|s| s.id == sensor_id)
            .ok_or_else(|| {
                RepositoryError::not_found(
                    format!("Sensor {} not found on box {}", sensor_id, box_id),
                    context(),
                )
            })?;
        sensor.last_measurement = Some(measurement_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Sensor, ValuePredicate};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 3, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_find_in_range_is_sorted_inclusive_and_limited() {
        let repo = LocalRepository::new();
        let sensor = SensorId::generate();
        // Insert out of order; the store keeps time order.
        for minutes in [30, 0, 10, 20, 40] {
            repo.store_measurement(Measurement::new(
                sensor,
                minutes.to_string(),
                t0() + Duration::minutes(minutes),
            ))
            .await
            .unwrap();
        }

        let range = TimeRange::new(t0() + Duration::minutes(10), t0() + Duration::minutes(30)).unwrap();
        let rows = repo.find_in_range(sensor, range, 100).await.unwrap();
        let values: Vec<&str> = rows.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["10", "20", "30"]);

        let limited = repo.find_in_range(sensor, range, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].value, "10");
    }

    #[tokio::test]
    async fn test_find_in_range_unknown_sensor_is_empty() {
        let repo = LocalRepository::new();
        let range = TimeRange::new(t0(), t0() + Duration::days(1)).unwrap();
        let rows = repo
            .find_in_range(SensorId::generate(), range, 10)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_count_and_aggregate_apply_filter() {
        let repo = LocalRepository::new();
        let sensor = SensorId::generate();
        repo.insert_measurements(
            ["5", "50", "150", "n/a"]
                .iter()
                .enumerate()
                .map(|(i, v)| Measurement::new(sensor, *v, t0() + Duration::minutes(i as i64))),
        );

        assert_eq!(repo.count_where(sensor, &SampleFilter::all()).await.unwrap(), 4);

        let below = SampleFilter::new(ValuePredicate::Below(100.0), Default::default());
        assert_eq!(repo.count_where(sensor, &below).await.unwrap(), 2);

        let agg = repo.aggregate_where(sensor, &below).await.unwrap();
        assert_eq!(agg.count, 2);
        assert_eq!(agg.values, vec!["5".to_string(), "50".to_string()]);
    }

    #[tokio::test]
    async fn test_unhealthy_store_fails_queries() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        let err = repo
            .count_where(SensorId::generate(), &SampleFilter::all())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert_eq!(err.context().operation.as_deref(), Some("count_where"));
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_measurement_rejected() {
        let repo = LocalRepository::new();
        let m = Measurement::new(SensorId::generate(), "1", t0());
        repo.store_measurement(m.clone()).await.unwrap();
        let err = repo.store_measurement(m).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_box_roundtrip_and_last_measurement() {
        let repo = LocalRepository::new();
        let sensor = Sensor::new("Temperatur", "°C");
        let sensor_id = sensor.id;
        let box_id = repo
            .store_box(SenseBox::new("garden", "fixed").with_sensor(sensor))
            .await
            .unwrap();

        let m = repo
            .store_measurement(Measurement::new(sensor_id, "21.5", t0()))
            .await
            .unwrap();
        repo.set_last_measurement(box_id, sensor_id, m.id).await.unwrap();

        let stored = repo.get_box(box_id).await.unwrap();
        assert_eq!(stored.sensors[0].last_measurement, Some(m.id));
        assert_eq!(repo.get_measurement(m.id).await.unwrap(), Some(m));
    }

    #[tokio::test]
    async fn test_missing_box_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo.get_box(BoxId::generate()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
