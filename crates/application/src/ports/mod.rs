//! Ports - Interfaces implemented by infrastructure adapters

mod cache_port;
mod weather_data_port;

pub use cache_port::{CachePort, CachePortExt, CacheStats, ttl};
pub use weather_data_port::WeatherDataPort;
#[cfg(test)]
pub use weather_data_port::MockWeatherDataPort;
