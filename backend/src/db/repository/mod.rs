//! Repository trait definitions for the measurement store.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`measurement`]: Range queries and count/aggregate queries on measurements
//! - [`sensebox`]: Box and sensor lookups
//!
//! # Convenience Trait Bound
//!
//! For functions that need both capabilities, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let sensebox = repo.get_box(box_id).await?;
//!     let total = repo.count_where(sensor_id, &SampleFilter::all()).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod measurement;
pub mod sensebox;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use measurement::MeasurementRepository;
pub use sensebox::BoxRepository;

/// Composite trait bound for a complete store implementation.
pub trait FullRepository: MeasurementRepository + BoxRepository {}

// Blanket implementation: any type implementing both traits is a FullRepository
impl<T> FullRepository for T where T: MeasurementRepository + BoxRepository {}
