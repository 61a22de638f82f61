//! Health aggregation service
//!
//! Checks upstream availability with a timeout and reports per-service status.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::ports::{CachePort, CacheStats, WeatherDataPort};

/// Default timeout for health checks in seconds
const DEFAULT_HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Configuration for health check behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Timeout for the upstream check in seconds (default: 5)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

const fn default_timeout() -> u64 {
    DEFAULT_HEALTH_CHECK_TIMEOUT_SECS
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

/// Status of an individual service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub healthy: bool,
    /// Response time in milliseconds (if the check completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            healthy: true,
            response_time_ms: None,
            error: None,
        }
    }

    #[must_use]
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            response_time_ms: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn timeout() -> Self {
        Self::unhealthy("Health check timed out")
    }

    #[must_use]
    pub const fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }
}

/// Health report for all checked services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// True if every service is healthy
    pub healthy: bool,
    pub services: HashMap<String, ServiceHealth>,
    /// Response cache counters, when caching is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    #[must_use]
    pub fn new(services: HashMap<String, ServiceHealth>) -> Self {
        let healthy = services.values().all(|s| s.healthy);

        Self {
            healthy,
            services,
            cache: None,
            checked_at: chrono::Utc::now(),
        }
    }
}

/// Service for checking upstream health
pub struct HealthService {
    config: HealthConfig,
    weather: Arc<dyn WeatherDataPort>,
    cache: Option<Arc<dyn CachePort>>,
}

impl std::fmt::Debug for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthService")
            .field("config", &self.config)
            .field("weather", &"<WeatherDataPort>")
            .field("cache", &self.cache)
            .finish()
    }
}

impl HealthService {
    #[must_use]
    pub fn new(weather: Arc<dyn WeatherDataPort>) -> Self {
        Self {
            config: HealthConfig::default(),
            weather,
            cache: None,
        }
    }

    /// Include the response cache counters in every report
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: HealthConfig) -> Self {
        self.config = config;
        self
    }

    /// Check every upstream dependency
    #[instrument(skip(self))]
    pub async fn check_all(&self) -> HealthReport {
        let mut services = HashMap::new();
        services.insert("nea".to_string(), self.check_weather().await);

        let mut report = HealthReport::new(services);
        report.cache = self.cache.as_ref().map(|cache| cache.stats());
        report
    }

    /// Check the NEA API
    #[instrument(skip(self))]
    pub async fn check_weather(&self) -> ServiceHealth {
        let start = std::time::Instant::now();
        let result = timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.weather.is_available(),
        )
        .await;

        if let Ok(available) = result {
            #[allow(clippy::cast_possible_truncation)]
            let response_time = start.elapsed().as_millis() as u64;
            if available {
                debug!(response_time_ms = response_time, "NEA API healthy");
                ServiceHealth::healthy().with_response_time(response_time)
            } else {
                warn!(response_time_ms = response_time, "NEA API unavailable");
                ServiceHealth::unhealthy("NEA API unavailable").with_response_time(response_time)
            }
        } else {
            warn!("NEA health check timed out");
            ServiceHealth::timeout()
        }
    }
}
