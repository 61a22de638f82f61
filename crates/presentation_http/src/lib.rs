//! SgWeather HTTP presentation layer
//!
//! JSON API over the NEA real-time weather data for dashboards and maps.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse, set_expose_internal_errors};
pub use routes::create_router;
pub use state::AppState;
