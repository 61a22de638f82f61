//! Response cache configuration.

use std::time::Duration;

use application::ports::ttl;
use serde::{Deserialize, Serialize};

use super::default_true;

/// Cache configuration with TTLs matched to NEA update frequencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether upstream responses are cached
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum cache size in megabytes
    #[serde(default = "default_max_capacity_mb")]
    pub max_capacity_mb: u64,

    /// TTL for latest station readings, lightning and WBGT (default: 60s)
    #[serde(default = "default_realtime_ttl")]
    pub realtime_ttl_secs: u64,

    /// TTL for the latest two-hour forecast (default: 5 minutes)
    #[serde(default = "default_forecast_ttl")]
    pub forecast_ttl_secs: u64,

    /// TTL for queries with an explicit date (default: 24 hours)
    #[serde(default = "default_historical_ttl")]
    pub historical_ttl_secs: u64,
}

const fn default_max_capacity_mb() -> u64 {
    32
}

const fn default_realtime_ttl() -> u64 {
    ttl::REALTIME.as_secs()
}

const fn default_forecast_ttl() -> u64 {
    ttl::FORECAST.as_secs()
}

const fn default_historical_ttl() -> u64 {
    ttl::HISTORICAL.as_secs()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity_mb: default_max_capacity_mb(),
            realtime_ttl_secs: default_realtime_ttl(),
            forecast_ttl_secs: default_forecast_ttl(),
            historical_ttl_secs: default_historical_ttl(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn realtime_ttl(&self) -> Duration {
        Duration::from_secs(self.realtime_ttl_secs)
    }

    #[must_use]
    pub const fn forecast_ttl(&self) -> Duration {
        Duration::from_secs(self.forecast_ttl_secs)
    }

    #[must_use]
    pub const fn historical_ttl(&self) -> Duration {
        Duration::from_secs(self.historical_ttl_secs)
    }
}
