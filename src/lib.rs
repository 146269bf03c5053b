//! Geomatch - radius-based matching of two point datasets
//!
//! Loads two `name, latitude, longitude` tables, pairs every point of the
//! first with every point of the second, and keeps the pairs whose
//! great-circle distance is within a radius. Results are written as a
//! comma-separated table.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{find_matches, haversine_distance, load_points, write_matches, MatchResult};
pub use error::MatchError;
pub use models::{LoadedPoints, MatchRecord, Point, SkippedRow};
