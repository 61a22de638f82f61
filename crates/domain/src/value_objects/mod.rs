//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod reading_query;

pub use geo_location::GeoLocation;
pub use reading_query::{ReadingDate, ReadingQuery};
