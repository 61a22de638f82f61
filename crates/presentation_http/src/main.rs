//! SgWeather HTTP Server
//!
//! Main entry point for the weather API server.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use infrastructure::{AppConfig, Environment, build_weather_backend, init_logging};
use presentation_http::{AppState, create_router, set_expose_internal_errors};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let requested = std::env::var(ENVIRONMENT_VAR)
        .ok()
        .and_then(|value| value.parse::<Environment>().ok());
    let (config, load_error) = config_or_default(AppConfig::load(), requested)?;

    init_logging(&config.logging)?;

    info!("SgWeather v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    for warning in config.warnings() {
        warn!("{warning}");
    }

    info!(
        environment = %config.environment,
        host = %config.server.host,
        port = %config.server.port,
        nea = %config.nea.base_url,
        cache = config.cache.enabled,
        "Configuration loaded"
    );

    set_expose_internal_errors(!config.environment.is_production());

    let backend = build_weather_backend(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize NEA client: {e}"))?;

    let cors_layer = cors_layer(&config);
    let addr = config.server.bind_address();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);

    let app = create_router(AppState::from_backend(backend, config)).layer(TraceLayer::new_for_http());
    let app = match cors_layer {
        Some(cors) => app.layer(cors),
        None => app,
    };

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Environment override consulted before the configuration is loaded
const ENVIRONMENT_VAR: &str = "SGWEATHER_ENVIRONMENT";

/// Fall back to development defaults when the configuration cannot be
/// loaded, unless production was requested
fn config_or_default<E: std::fmt::Display>(
    loaded: Result<AppConfig, E>,
    requested: Option<Environment>,
) -> anyhow::Result<(AppConfig, Option<String>)> {
    match loaded {
        Ok(config) => Ok((config, None)),
        Err(e) if requested.is_some_and(Environment::is_production) => {
            Err(anyhow::anyhow!("Invalid production configuration: {e}"))
        },
        Err(e) => Ok((AppConfig::default(), Some(e.to_string()))),
    }
}

/// Any origin when none are configured, otherwise only the configured ones
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.server.cors_enabled {
        return None;
    }

    let layer = if config.server.allowed_origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Some(
        layer
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any),
    )
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    info!("Waiting up to {:?} for connections to close...", timeout);
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        warn!("Connections still open after shutdown timeout, exiting");
        std::process::exit(1);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_config_is_used_as_is() {
        let config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        let (config, error) =
            config_or_default::<String>(Ok(config), Some(Environment::Production)).unwrap();
        assert!(config.environment.is_production());
        assert!(error.is_none());
    }

    #[test]
    fn development_falls_back_to_defaults() {
        let (config, error) =
            config_or_default::<String>(Err("bad port".to_string()), None).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(error.as_deref(), Some("bad port"));
    }

    #[test]
    fn production_refuses_to_fall_back() {
        let err = config_or_default::<String>(
            Err("nea.base_url must be http(s)".to_string()),
            Some(Environment::Production),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid production configuration"));
    }
}
