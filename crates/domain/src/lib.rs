//! Domain layer for SgWeather
//!
//! Contains the weather entities mirrored from the NEA real-time API,
//! value objects, aggregation helpers and domain errors.
//! This layer performs no I/O.

pub mod aggregation;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use aggregation::{
    ReadingStats, circular_mean_degrees, compass_point, knots_to_kmh, knots_to_ms,
};
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
