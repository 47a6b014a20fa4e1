//! High-level store service layer.
//!
//! Repository-agnostic operations that work with any implementation of the
//! repository traits. Handlers call these instead of the traits directly.
//!
//! # Usage
//!
//! ```no_run
//! use osem_rust::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let healthy = services::health_check(&repo).await?;
//!     println!("store healthy: {}", healthy);
//!     Ok(())
//! }
//! ```

use log::{debug, warn};

use super::repository::{FullRepository, RepositoryResult};
use crate::api::{BoxId, SenseBox, SensorReading, SensorsOverview};

// ==================== Health & Connection ====================

/// Check if the store connection is healthy.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Box Operations ====================

/// Fetch a box with its sensors.
pub async fn get_box<R: FullRepository + ?Sized>(
    repo: &R,
    box_id: BoxId,
) -> RepositoryResult<SenseBox> {
    repo.get_box(box_id).await.map_err(|e| {
        if !e.is_not_found() {
            warn!("Failed to load box {}: {}", box_id, e);
        }
        e
    })
}

/// Store a box (used for seeding and tests; box management lives elsewhere).
pub async fn store_box<R: FullRepository + ?Sized>(
    repo: &R,
    sensebox: SenseBox,
) -> RepositoryResult<BoxId> {
    debug!("Storing box '{}' with {} sensors", sensebox.name, sensebox.sensors.len());
    repo.store_box(sensebox).await
}

/// List a box's sensors together with each sensor's last measurement.
///
/// A sensor whose last measurement reference cannot be resolved is reported
/// with `last_measurement = None`.
pub async fn latest_measurements<R: FullRepository + ?Sized>(
    repo: &R,
    box_id: BoxId,
) -> RepositoryResult<SensorsOverview> {
    let sensebox = get_box(repo, box_id).await?;

    let mut sensors = Vec::with_capacity(sensebox.sensors.len());
    for sensor in sensebox.sensors {
        let last_measurement = match sensor.last_measurement {
            Some(id) => repo.get_measurement(id).await?,
            None => None,
        };
        sensors.push(SensorReading {
            id: sensor.id,
            title: sensor.title,
            unit: sensor.unit,
            sensor_type: sensor.sensor_type,
            last_measurement,
        });
    }

    Ok(SensorsOverview {
        box_id: sensebox.id,
        sensors,
    })
}
