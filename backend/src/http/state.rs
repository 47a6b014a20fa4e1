//! Application state for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::db::repository::FullRepository;
use crate::services::distributions::BucketEvaluation;
use crate::services::downsampling::Downsampler;
use crate::services::error::AnalyticsResult;

/// Shared application state passed to all handlers.
///
/// This is the whole request context: the store handle plus the limits the
/// engines run with.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for store operations
    pub repository: Arc<dyn FullRepository>,
    pub config: Arc<AppConfig>,
    /// Limits for the data endpoint, validated once at startup
    pub sampler: Downsampler,
}

impl AppState {
    /// Create the state, rejecting limits that fail [`AppConfig::validate`].
    pub fn new(repository: Arc<dyn FullRepository>, config: AppConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        let sampler = Downsampler::new(config.limits.query_limit, config.limits.result_limit)?;
        Ok(Self {
            repository,
            config: Arc::new(config),
            sampler,
        })
    }

    pub fn query_timeout(&self) -> Duration {
        self.config.server.query_timeout()
    }

    pub fn bucket_evaluation(&self) -> BucketEvaluation {
        BucketEvaluation::from_parallel_flag(self.config.distribution.parallel_buckets)
    }
}
