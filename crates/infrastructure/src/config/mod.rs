//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `cache`: response cache TTLs
//! - `logging`: log filter and format
//!
//! The NEA client, dashboard and health sections reuse the config types of
//! the crates that consume them.

mod cache;
mod logging;
mod server;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use application::{DashboardConfig, HealthConfig};
use integration_nea::NeaConfig;
use serde::{Deserialize, Serialize};

pub use cache::CacheConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Environment variable prefix, e.g. `SGWEATHER_SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "SGWEATHER";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Controls CORS defaults and whether internal error details are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    /// NEA API client settings
    #[serde(default)]
    pub nea: NeaConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Dashboard hub settings
    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration: defaults, then `config.toml` if present, then
    /// `SGWEATHER_*` environment variables (nested keys separated by `__`)
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(None, None)
    }

    /// Load with an explicit config file instead of `config.toml`
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(Some(path), None)
    }

    fn build(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Reject settings the services cannot run with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let base_url = &self.nea.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(config::ConfigError::Message(format!(
                "nea.base_url must be an http(s) URL, got '{base_url}'"
            )));
        }
        if self.nea.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "nea.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.dashboard.source_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "dashboard.source_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings that work but are questionable for the environment
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.environment.is_production()
            && self.server.cors_enabled
            && self.server.allowed_origins.is_empty()
        {
            warnings.push(
                "CORS allows any origin in production; set server.allowed_origins".to_string(),
            );
        }
        if !self.cache.enabled {
            warnings.push("Response cache disabled; every request hits the NEA API".to_string());
        }
        warnings
    }
}
