//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the NEA adapter,
//! the response cache, configuration loading and log setup.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod logging;

pub use adapters::*;
pub use cache::{MokaCache, MokaCacheConfig};
pub use config::{AppConfig, CacheConfig, Environment, LogFormat, LoggingConfig, ServerConfig};
pub use logging::{LoggingError, init_logging};

use std::sync::Arc;

use application::{
    ApplicationError,
    ports::{CachePort, WeatherDataPort},
};

/// Weather data port plus the response cache behind it, if any
pub struct WeatherBackend {
    pub port: Arc<dyn WeatherDataPort>,
    /// Exposed so the readiness check can report cache counters
    pub cache: Option<Arc<dyn CachePort>>,
}

impl std::fmt::Debug for WeatherBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherBackend")
            .field("port", &"<WeatherDataPort>")
            .field("cache", &self.cache)
            .finish()
    }
}

/// Build the weather backend from configuration: the NEA adapter, wrapped
/// in the response cache when caching is enabled
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be initialized.
pub fn build_weather_backend(config: &AppConfig) -> Result<WeatherBackend, ApplicationError> {
    let nea: Arc<dyn WeatherDataPort> = Arc::new(NeaWeatherAdapter::new(config.nea.clone())?);
    if !config.cache.enabled {
        return Ok(WeatherBackend {
            port: nea,
            cache: None,
        });
    }

    let ttls = CacheTtls {
        realtime: config.cache.realtime_ttl(),
        forecast: config.cache.forecast_ttl(),
        historical: config.cache.historical_ttl(),
    };
    let cache: Arc<dyn CachePort> = Arc::new(MokaCache::with_config(MokaCacheConfig {
        max_capacity_mb: config.cache.max_capacity_mb,
        max_ttl: ttls.historical.max(ttls.forecast).max(ttls.realtime),
    }));
    let port = CachedWeatherAdapter::new(nea, Arc::clone(&cache)).with_ttls(ttls);
    Ok(WeatherBackend {
        port: Arc::new(port),
        cache: Some(cache),
    })
}
