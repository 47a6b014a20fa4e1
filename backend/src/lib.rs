//! # openSenseMap Analytics Backend
//!
//! Measurement analytics for a sensor-data collection service.
//!
//! Field devices ("boxes") post readings for their sensors; this crate stores
//! them and serves them back in three shapes:
//!
//! - **Raw**, time-bounded and downsampled to a fixed number of points
//! - **Bucketed**, as per-interval counts and percentages over user-defined
//!   value boundaries, optionally restricted to months and hours of the day
//! - **Latest**, one value per sensor
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier types and re-exports of every public DTO
//! - [`models`]: Measurements, sensors, boxes, time ranges and sample filters
//! - [`db`]: Measurement store traits, the in-memory store and its factory
//! - [`services`]: Downsampling and distribution engines, export formats
//! - [`config`]: TOML configuration with environment overrides
//! - [`routes`]: Response types per endpoint
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
