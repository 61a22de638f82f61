//! SgWeather CLI
//!
//! Terminal dashboard for the SgWeather HTTP API.

#![allow(clippy::print_stdout)]

mod api;
mod render;

use application::{DashboardSnapshot, NearestForecast};
use clap::{Parser, Subcommand};
use presentation_http::handlers::{health::ReadinessResponse, weather::AreaForecastResponse};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiClient;

const DEFAULT_URL: &str = "http://localhost:3000";

/// SgWeather CLI
#[derive(Parser)]
#[command(name = "sgweather-cli")]
#[command(author, version, about = "Singapore real-time weather in the terminal", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the raw JSON response instead of text panels
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show forecast, temperature, humidity, wind, lightning and WBGT
    Dashboard {
        /// Restrict the forecast panel to matching areas
        #[arg(short, long)]
        area: Option<String>,

        /// Historical date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(short, long)]
        date: Option<String>,

        /// Server URL
        #[arg(short, long, env = "SGWEATHER_URL", default_value = DEFAULT_URL)]
        url: String,
    },

    /// Show the latest two-hour forecast per area
    Forecast {
        /// Case-insensitive part of the area name
        #[arg(short, long)]
        area: Option<String>,

        /// Server URL
        #[arg(short, long, env = "SGWEATHER_URL", default_value = DEFAULT_URL)]
        url: String,
    },

    /// Show the forecast for the area closest to a coordinate
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,

        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,

        /// Server URL
        #[arg(short, long, env = "SGWEATHER_URL", default_value = DEFAULT_URL)]
        url: String,
    },

    /// Check server and upstream health
    Health {
        /// Server URL
        #[arg(short, long, env = "SGWEATHER_URL", default_value = DEFAULT_URL)]
        url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Closing line of the text health output
fn health_summary(status: reqwest::StatusCode) -> String {
    if status.is_success() {
        "Healthy".to_string()
    } else {
        format!("Unhealthy: HTTP {status}")
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(
            cli.verbose,
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Dashboard { area, date, url } => {
            let snapshot: DashboardSnapshot = ApiClient::new(&url)
                .get_json("/v1/weather/dashboard", &[("area", area), ("date", date)])
                .await?;
            if cli.json {
                print_json(&snapshot)?;
            } else {
                println!("{}", render::dashboard(&snapshot));
            }
        },

        Commands::Forecast { area, url } => {
            let response: AreaForecastResponse = ApiClient::new(&url)
                .get_json("/v1/weather/forecast", &[("area", area)])
                .await?;
            if cli.json {
                print_json(&response)?;
            } else {
                println!("{}", render::area_forecasts(&response.forecasts).join("\n"));
            }
        },

        Commands::Nearest {
            latitude,
            longitude,
            url,
        } => {
            let nearest: NearestForecast = ApiClient::new(&url)
                .get_json(
                    "/v1/weather/forecast/nearest",
                    &[
                        ("latitude", Some(latitude.to_string())),
                        ("longitude", Some(longitude.to_string())),
                    ],
                )
                .await?;
            if cli.json {
                print_json(&nearest)?;
            } else {
                println!("{}", render::nearest(&nearest));
            }
        },

        Commands::Health { url } => {
            let client = ApiClient::new(&url);
            match client.get_raw("/ready", &[]).await {
                Ok((status, body)) => {
                    let readiness = serde_json::from_str::<ReadinessResponse>(&body).ok();
                    if cli.json {
                        println!("{body}");
                    } else if let Some(readiness) = &readiness {
                        for (name, health) in &readiness.services {
                            let state = if health.healthy { "ok" } else { "down" };
                            let detail = health.error.as_deref().unwrap_or("");
                            println!("{name}: {state} {detail}");
                        }
                    }
                    if !cli.json {
                        println!("{}", health_summary(status));
                    }
                    if !status.is_success() {
                        std::process::exit(1);
                    }
                },
                Err(e) => {
                    println!("Unhealthy: {e}");
                    std::process::exit(1);
                },
            }
        },
    }

    Ok(())
}
