//! Raw time-series access and measurement ingestion.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::downsampling::Downsampler;
use super::error::{AnalyticsError, AnalyticsResult};
use crate::api::{BoxId, Measurement, MeasurementPoint, SensorId, TimeRange};
use crate::config::SamplingPolicy;
use crate::db::repository::{FullRepository, MeasurementRepository};
use crate::models::{parse_decimal, parse_timestamp};

/// Treat a missing or empty query parameter as absent.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(raw: &str, name: &str) -> AnalyticsResult<DateTime<Utc>> {
    parse_timestamp(raw).ok_or_else(|| {
        AnalyticsError::InvalidRange(format!("'{}' is not a valid {}", raw, name))
    })
}

/// Resolve the optional `from-date` / `to-date` pair of a data request.
///
/// `to` defaults to `now`, `from` to `to` minus the policy's lookback. The
/// window is checked before any store access: `to` must not precede `from`
/// and the width must not exceed the policy's maximum.
pub fn resolve_time_range(
    from: Option<&str>,
    to: Option<&str>,
    now: DateTime<Utc>,
    policy: &SamplingPolicy,
) -> AnalyticsResult<TimeRange> {
    let to = match present(to) {
        Some(raw) => parse_date(raw, "to-date")?,
        None => now,
    };
    let from = match present(from) {
        Some(raw) => parse_date(raw, "from-date")?,
        None => policy
            .default_lookback()
            .and_then(|lookback| to.checked_sub_signed(lookback))
            .ok_or_else(|| {
                AnalyticsError::Range(format!(
                    "default lookback of {} days is out of range",
                    policy.default_lookback_days
                ))
            })?,
    };

    let range = TimeRange::new(from, to)
        .ok_or_else(|| AnalyticsError::InvalidRange("Invalid time frame specified".to_string()))?;

    let max_window = policy.max_window().ok_or_else(|| {
        AnalyticsError::Range(format!(
            "maximum window of {} days is out of range",
            policy.max_window_days
        ))
    })?;
    if range.width() > max_window {
        return Err(AnalyticsError::InvalidRange(format!(
            "Please choose a time frame up to {} days maximum",
            (policy.max_window_days - 1).max(0)
        )));
    }
    Ok(range)
}

/// Fetch a sensor's points inside `range`, capped and downsampled.
///
/// At most `sampler.query_limit()` rows are read, oldest first; the result
/// holds at most `sampler.result_limit()` points.
pub async fn get_data<R: MeasurementRepository + ?Sized>(
    repo: &R,
    sensor_id: SensorId,
    range: TimeRange,
    sampler: &Downsampler,
) -> AnalyticsResult<Vec<MeasurementPoint>> {
    debug!("Data for sensor {} from {} to {}", sensor_id, range.from(), range.to());

    let raw = repo
        .find_in_range(sensor_id, range, sampler.query_limit())
        .await
        .map_err(|e| {
            warn!("Range query for sensor {} failed: {}", sensor_id, e);
            AnalyticsError::StoreQuery(e)
        })?;

    Ok(sampler
        .apply(raw)
        .into_iter()
        .map(MeasurementPoint::from)
        .collect())
}

/// Store a new reading for a sensor of a box and make it the sensor's
/// latest measurement.
///
/// The box is updated before the reading is written. A failed write leaves
/// a dangling reference, which `latest_measurements` reports as no reading;
/// a failed box update leaves no stray measurement behind.
///
/// # Errors
/// * `InvalidValue` - empty or non-numeric value
/// * `BoxNotFound` / `SensorNotFound` - the sensor is not part of the box
/// * `StoreQuery` - the store failed
pub async fn record_measurement<R: FullRepository + ?Sized>(
    repo: &R,
    box_id: BoxId,
    sensor_id: SensorId,
    value: &str,
    now: DateTime<Utc>,
) -> AnalyticsResult<Measurement> {
    let value = value.trim();
    if parse_decimal(value).is_none() {
        return Err(AnalyticsError::InvalidValue(format!(
            "'{}' is not a decimal number",
            value
        )));
    }

    let sensebox = repo
        .get_box(box_id)
        .await
        .map_err(|e| AnalyticsError::from_box_lookup(box_id, e))?;
    if sensebox.sensor(sensor_id).is_none() {
        return Err(AnalyticsError::SensorNotFound { box_id, sensor_id });
    }

    let measurement = Measurement::new(sensor_id, value, now);
    repo.set_last_measurement(box_id, sensor_id, measurement.id).await?;
    let stored = repo.store_measurement(measurement).await?;

    info!("Stored measurement {} for sensor {}", stored.id, sensor_id);
    Ok(stored)
}
