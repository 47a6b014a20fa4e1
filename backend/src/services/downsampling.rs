//! Uniform decimation of time series for transport.
//!
//! When a range query returns more rows than a client should receive, every
//! `stride`-th row is kept, starting with the first, where
//! `stride = ceil(len / result_limit)`.
//!
//! This is a known approximation: each stride window is represented by its
//! *first* point, not by an average or a random member. Peaks that fall
//! between kept points are lost, and the kept points are not a statistically
//! uniform sample of the window.

use log::info;

use super::error::{AnalyticsError, AnalyticsResult};

/// Sampling limits validated once and reused per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downsampler {
    query_limit: usize,
    result_limit: usize,
}

impl Downsampler {
    /// Validate the limit pair.
    ///
    /// # Errors
    /// `AnalyticsError::Range` when `result_limit == 0` or
    /// `query_limit < result_limit`.
    pub fn new(query_limit: usize, result_limit: usize) -> AnalyticsResult<Self> {
        if result_limit == 0 {
            return Err(AnalyticsError::Range(
                "result limit must be greater than zero".to_string(),
            ));
        }
        if query_limit < result_limit {
            return Err(AnalyticsError::Range(format!(
                "query limit {} is smaller than result limit {}",
                query_limit, result_limit
            )));
        }
        Ok(Self {
            query_limit,
            result_limit,
        })
    }

    /// Raw rows the caller may fetch before downsampling.
    pub fn query_limit(&self) -> usize {
        self.query_limit
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// Reduce `points` to at most `result_limit` elements.
    pub fn apply<T>(&self, points: Vec<T>) -> Vec<T> {
        downsample(points, self.result_limit)
    }
}

/// Keep every element whose index is a multiple of `ceil(len / result_limit)`.
///
/// Returns the input unchanged when it already fits. The output is an
/// order-preserving subsequence of the input with at most `result_limit`
/// elements. A `result_limit` of zero yields an empty output; use
/// [`Downsampler::new`] to reject that configuration up front.
pub fn downsample<T>(points: Vec<T>, result_limit: usize) -> Vec<T> {
    if points.len() <= result_limit {
        return points;
    }
    if result_limit == 0 {
        return Vec::new();
    }

    let original_len = points.len();
    let stride = original_len.div_ceil(result_limit);
    let sampled: Vec<T> = points.into_iter().step_by(stride).collect();

    info!(
        "Downsampled {} points to {} (every {}th)",
        original_len,
        sampled.len(),
        stride
    );
    sampled
}
