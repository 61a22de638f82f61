//! Application state shared across handlers

use std::sync::Arc;

use application::{DashboardService, HealthService, WeatherService, ports::WeatherDataPort};
use infrastructure::{AppConfig, WeatherBackend};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Per-endpoint weather queries
    pub weather_service: Arc<WeatherService>,
    /// Dashboard hub
    pub dashboard_service: Arc<DashboardService>,
    /// Upstream health checks
    pub health_service: Arc<HealthService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire every service onto one weather data port
    #[must_use]
    pub fn new(port: Arc<dyn WeatherDataPort>, config: AppConfig) -> Self {
        Self::from_backend(WeatherBackend { port, cache: None }, config)
    }

    /// Like [`AppState::new`], reporting cache counters on `/ready` when the
    /// backend has a cache
    #[must_use]
    pub fn from_backend(backend: WeatherBackend, config: AppConfig) -> Self {
        let WeatherBackend { port, cache } = backend;
        let mut health = HealthService::new(Arc::clone(&port)).with_config(config.health.clone());
        if let Some(cache) = cache {
            health = health.with_cache(cache);
        }

        Self {
            weather_service: Arc::new(WeatherService::new(Arc::clone(&port))),
            dashboard_service: Arc::new(
                DashboardService::new(Arc::clone(&port)).with_config(config.dashboard.clone()),
            ),
            health_service: Arc::new(health),
            config: Arc::new(config),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.environment)
            .finish_non_exhaustive()
    }
}
