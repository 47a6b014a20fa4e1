//! Interval distribution of a sensor's historical values.
//!
//! Sorted boundaries `b0 < b1 < ... < bn-1` define `n + 1` buckets:
//!
//! ```text
//! bucket 0      v < b0
//! bucket i      b(i-1) < v < b(i)      for 0 < i < n
//! bucket n      v > b(n-1)
//! ```
//!
//! All comparisons are strict, so a value exactly equal to a boundary falls
//! into no bucket. For each bucket one aggregation query is sent to the store;
//! the percentage is taken against a single total count queried first.
//!
//! The total and the bucket queries are separate reads. A measurement written
//! in between is seen by some of them and not others, so `total_count` and
//! the sum of bucket counts may disagree under concurrent ingestion.

use futures::future::try_join_all;
use log::{debug, info, warn};

use super::error::{AnalyticsError, AnalyticsResult};
use crate::api::{
    Aggregate, BoxId, BucketStat, DistributionResult, SampleFilter, SeasonalWindow, Sensor,
    SensorId, ValuePredicate,
};
use crate::db::repository::{BoxRepository, FullRepository, MeasurementRepository};

/// How the per-bucket queries are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketEvaluation {
    /// One query after another, in bucket order.
    #[default]
    Sequential,
    /// All bucket queries at once. Results are still assembled in bucket
    /// order and the first failure still discards the whole distribution.
    Parallel,
}

impl BucketEvaluation {
    pub fn from_parallel_flag(parallel: bool) -> Self {
        if parallel {
            Self::Parallel
        } else {
            Self::Sequential
        }
    }
}

/// One value interval; `None` ends are unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub index: usize,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl Bucket {
    /// Interval for bucket `index` over ascending `sorted` boundaries.
    ///
    /// `sorted` must be non-empty and `index <= sorted.len()`.
    pub fn for_index(sorted: &[f64], index: usize) -> Self {
        let start = index.checked_sub(1).map(|i| sorted[i]);
        let end = sorted.get(index).copied();
        Self { index, start, end }
    }

    pub fn predicate(&self) -> ValuePredicate {
        match (self.start, self.end) {
            (None, Some(end)) => ValuePredicate::Below(end),
            (Some(start), Some(end)) => ValuePredicate::Between(start, end),
            (Some(start), None) => ValuePredicate::Above(start),
            (None, None) => ValuePredicate::Any,
        }
    }
}

/// All `sorted.len() + 1` buckets in index order.
pub fn buckets(sorted: &[f64]) -> Vec<Bucket> {
    (0..=sorted.len())
        .map(|i| Bucket::for_index(sorted, i))
        .collect()
}

/// Ascending stable sort. Duplicates are kept and produce empty buckets.
pub fn sort_boundaries(boundaries: &[f64]) -> Vec<f64> {
    let mut sorted = boundaries.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// `count / total * 100`, defined as `0` when there are no samples.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Parse the bucket boundaries of a conditions request.
///
/// Accepts `[0,100,200]`, `0,100,200` or a single number. Order does not
/// matter; the analyzer sorts.
pub fn parse_bounds(raw: &str) -> AnalyticsResult<Vec<f64>> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    if inner.trim().is_empty() {
        return Err(AnalyticsError::InvalidBounds(
            "Format for bounds has to be an Array of numbers or one single number".to_string(),
        ));
    }

    inner
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    AnalyticsError::InvalidBounds(format!("'{}' is not a finite number", part))
                })
        })
        .collect()
}

/// Build the seasonal window from the optional `months` and `hours` parameters.
pub fn parse_window(months: Option<&str>, hours: Option<&str>) -> AnalyticsResult<SeasonalWindow> {
    let months = months
        .filter(|m| !m.trim().is_empty())
        .map(|m| m.parse())
        .transpose()
        .map_err(AnalyticsError::InvalidFilter)?;
    let hours = hours
        .filter(|h| !h.trim().is_empty())
        .map(|h| h.parse())
        .transpose()
        .map_err(AnalyticsError::InvalidFilter)?;
    Ok(SeasonalWindow { months, hours })
}

/// Accumulates bucket results in index order.
struct DistributionBuilder {
    sensor_id: SensorId,
    measurement: String,
    total_count: u64,
    expected: usize,
    buckets: Vec<BucketStat>,
}

impl DistributionBuilder {
    fn new(sensor_id: SensorId, measurement: &str, total_count: u64, expected: usize) -> Self {
        Self {
            sensor_id,
            measurement: measurement.to_string(),
            total_count,
            expected,
            buckets: Vec::with_capacity(expected),
        }
    }

    fn push(&mut self, bucket: &Bucket, aggregate: &Aggregate) {
        debug_assert_eq!(bucket.index, self.buckets.len());
        self.buckets.push(BucketStat {
            interval_start: bucket.start,
            interval_end: bucket.end,
            count: aggregate.count,
            percentage: percentage(aggregate.count, self.total_count),
        });
    }

    fn finish(self) -> AnalyticsResult<DistributionResult> {
        if self.buckets.len() != self.expected {
            return Err(AnalyticsError::StoreQuery(
                crate::db::repository::RepositoryError::internal(format!(
                    "distribution incomplete: {} of {} buckets",
                    self.buckets.len(),
                    self.expected
                )),
            ));
        }
        Ok(DistributionResult {
            sensor_id: self.sensor_id,
            measurement: self.measurement,
            total_count: self.total_count,
            buckets: self.buckets,
        })
    }
}

async fn query_bucket<R: MeasurementRepository + ?Sized>(
    repo: &R,
    sensor_id: SensorId,
    bucket: &Bucket,
    window: SeasonalWindow,
) -> AnalyticsResult<Aggregate> {
    let filter = SampleFilter::new(bucket.predicate(), window);
    debug!(
        "Bucket {} for sensor {}: {}",
        bucket.index, sensor_id, filter.value
    );
    repo.aggregate_where(sensor_id, &filter).await.map_err(|e| {
        warn!(
            "Aggregation for bucket {} of sensor {} failed: {}",
            bucket.index, sensor_id, e
        );
        AnalyticsError::StoreQuery(e)
    })
}

/// Compute per-bucket counts and percentages for one sensor.
///
/// # Arguments
/// * `repo` - Measurement store
/// * `sensor_id` - Sensor whose values are classified
/// * `measurement` - Measurement title echoed in the result
/// * `boundaries` - Bucket boundaries in any order; must be non-empty
/// * `window` - Seasonal restriction applied to the total and to every bucket
/// * `evaluation` - Sequential or parallel bucket queries
///
/// # Errors
/// * `InvalidBounds` - empty or non-finite boundaries
/// * `StoreQuery` - the total or any bucket query failed; no partial result
pub async fn analyze_distribution<R: MeasurementRepository + ?Sized>(
    repo: &R,
    sensor_id: SensorId,
    measurement: &str,
    boundaries: &[f64],
    window: SeasonalWindow,
    evaluation: BucketEvaluation,
) -> AnalyticsResult<DistributionResult> {
    if boundaries.is_empty() {
        return Err(AnalyticsError::InvalidBounds(
            "at least one boundary is required".to_string(),
        ));
    }
    if let Some(bad) = boundaries.iter().find(|b| !b.is_finite()) {
        return Err(AnalyticsError::InvalidBounds(format!(
            "'{}' is not a finite number",
            bad
        )));
    }

    let sorted = sort_boundaries(boundaries);
    let plan = buckets(&sorted);

    let total_count = repo
        .count_where(sensor_id, &SampleFilter::new(ValuePredicate::Any, window))
        .await
        .map_err(|e| {
            warn!("Total count for sensor {} failed: {}", sensor_id, e);
            AnalyticsError::StoreQuery(e)
        })?;
    info!(
        "Distribution of '{}' for sensor {}: {} samples, {} buckets",
        measurement,
        sensor_id,
        total_count,
        plan.len()
    );

    let mut builder = DistributionBuilder::new(sensor_id, measurement, total_count, plan.len());
    match evaluation {
        BucketEvaluation::Sequential => {
            for bucket in &plan {
                let aggregate = query_bucket(repo, sensor_id, bucket, window).await?;
                builder.push(bucket, &aggregate);
            }
        }
        BucketEvaluation::Parallel => {
            let aggregates =
                try_join_all(plan.iter().map(|b| query_bucket(repo, sensor_id, b, window)))
                    .await?;
            for (bucket, aggregate) in plan.iter().zip(&aggregates) {
                builder.push(bucket, aggregate);
            }
        }
    }

    builder.finish()
}

/// Find the sensor of `box_id` whose title equals `measurement`.
///
/// # Errors
/// * `BoxNotFound` - the box does not exist
/// * `MeasurementNotFound` - no sensor carries that title
/// * `StoreQuery` - the lookup failed
pub async fn resolve_sensor<R: BoxRepository + ?Sized>(
    repo: &R,
    box_id: BoxId,
    measurement: &str,
) -> AnalyticsResult<Sensor> {
    let sensebox = repo
        .get_box(box_id)
        .await
        .map_err(|e| AnalyticsError::from_box_lookup(box_id, e))?;

    sensebox
        .find_sensor_by_title(measurement)
        .cloned()
        .ok_or_else(|| AnalyticsError::MeasurementNotFound {
            box_id,
            measurement: measurement.to_string(),
        })
}

/// Resolve `measurement` on a box and compute its distribution.
pub async fn get_conditions<R: FullRepository + ?Sized>(
    repo: &R,
    box_id: BoxId,
    measurement: &str,
    boundaries: &[f64],
    window: SeasonalWindow,
    evaluation: BucketEvaluation,
) -> AnalyticsResult<DistributionResult> {
    let sensor = resolve_sensor(repo, box_id, measurement).await?;
    analyze_distribution(repo, sensor.id, &sensor.title, boundaries, window, evaluation).await
}

#[cfg(test)]
#[path = "distributions_tests.rs"]
mod distributions_tests;
