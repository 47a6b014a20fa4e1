//! HTTP server module for the sensor analytics backend.
//!
//! This module provides an axum-based HTTP server that exposes the engines
//! as a REST API. It reuses the service layer, repository pattern, and DTOs
//! from the core library.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Path/query parsing, JSON and CSV rendering             │
//! │  - CORS, compression, tracing, timeouts                   │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Engines (services/)                                      │
//! │  - Downsampling, distribution analysis                    │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Measurement store (db/)                                  │
//! │  - LocalRepository                                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Endpoints
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/health` | [`handlers::health_check`] |
//! | GET | `/boxes/{box_id}/sensors` | [`handlers::get_sensors`] |
//! | POST | `/boxes/{box_id}/{sensor_id}` | [`handlers::post_measurement`] |
//! | GET | `/boxes/{box_id}/data/{sensor_id}` | [`handlers::get_data`] |
//! | GET | `/boxes/{box_id}/conditions/{measurement}/{bounds}` | [`handlers::get_conditions`] |

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
