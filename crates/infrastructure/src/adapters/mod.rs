//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod cached_weather_adapter;
mod nea_adapter;

pub use cached_weather_adapter::{CacheTtls, CachedWeatherAdapter};
pub use nea_adapter::NeaWeatherAdapter;
