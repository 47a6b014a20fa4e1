use serde::{Deserialize, Serialize};

use crate::api::SensorId;

/// Count and share of samples inside one value interval.
///
/// `None` bounds stand for negative or positive infinity and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStat {
    pub interval_start: Option<f64>,
    pub interval_end: Option<f64>,
    pub count: u64,
    /// `count / totalCount * 100`, or `0` when there are no samples.
    pub percentage: f64,
}

/// Distribution of one sensor's values over caller-defined buckets.
///
/// Buckets are ordered by interval. The sum of bucket counts can be lower
/// than `total_count`: samples equal to a boundary, samples whose value is
/// not numeric, and samples written between the total query and the bucket
/// queries are not attributed to any bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResult {
    pub sensor_id: SensorId,
    pub measurement: String,
    pub total_count: u64,
    pub buckets: Vec<BucketStat>,
}

impl DistributionResult {
    /// Samples attributed to some bucket.
    pub fn accounted_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn percentage_sum(&self) -> f64 {
        self.buckets.iter().map(|b| b.percentage).sum()
    }
}

pub const GET_CONDITIONS: &str = "get_conditions";
