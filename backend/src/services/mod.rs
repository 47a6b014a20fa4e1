//! Analytic engines layered on the measurement store.
//!
//! Every engine takes the store and its limits as explicit arguments; there
//! is no global state. The HTTP layer only parses requests, calls one of
//! these functions and serializes the result.

pub mod distributions;
pub mod downsampling;
pub mod error;
pub mod export;
pub mod measurements;

pub use distributions::{analyze_distribution, get_conditions, BucketEvaluation};
pub use downsampling::{downsample, Downsampler};
pub use error::{AnalyticsError, AnalyticsResult};
pub use export::ExportFormat;
pub use measurements::{get_data, record_measurement, resolve_time_range};
