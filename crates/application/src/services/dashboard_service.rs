//! Dashboard hub
//!
//! Fans out one request per upstream endpoint in parallel, bounds each by a
//! timeout and merges the results into a single snapshot. Every source is
//! tagged independently: a failing endpoint never fails the whole snapshot.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use domain::{
    AreaForecast, ForecastPeriod, GeoLocation, HeatStress, LightningReport, LightningStrike,
    ReadingDate, ReadingQuery, ReadingStats, StationMetric, StationObservation, StationReadings,
    TwoHourForecast, WbgtReading, WbgtReport, circular_mean_degrees, compass_point, knots_to_kmh,
    knots_to_ms,
};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::{error::ApplicationError, ports::WeatherDataPort};

/// Default per-source timeout in seconds
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;

/// Hub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Timeout applied to each upstream request (default: 10)
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,
}

const fn default_source_timeout() -> u64 {
    DEFAULT_SOURCE_TIMEOUT_SECS
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: default_source_timeout(),
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub const fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

/// Outcome of one dashboard source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Ready { data: T },
    /// Upstream answered, but had nothing to show
    NoData { message: String },
    Failed { error: String },
}

impl<T> Section<T> {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Section<U> {
        match self {
            Self::Ready { data } => Section::Ready { data: f(data) },
            Self::NoData { message } => Section::NoData { message },
            Self::Failed { error } => Section::Failed { error },
        }
    }

    fn from_result(result: Result<T, ApplicationError>) -> Self {
        match result {
            Ok(data) => Self::Ready { data },
            Err(e) if e.is_no_data() => Self::NoData {
                message: e.to_string(),
            },
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// What the dashboard should show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRequest {
    /// Restrict the forecast panel to areas containing this name
    pub area: Option<String>,
    /// Historical date; latest data when `None`
    pub date: Option<ReadingDate>,
}

/// Forecast panel: latest period with per-area forecasts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPanel {
    pub valid_period: Option<ForecastPeriod>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub areas: Vec<AreaForecast>,
}

/// Temperature or humidity panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPanel {
    pub metric: StationMetric,
    pub unit: Option<String>,
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub stats: Option<ReadingStats>,
    pub stations: Vec<StationObservation>,
}

/// Wind at one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindStation {
    pub station_id: String,
    pub name: Option<String>,
    pub location: Option<GeoLocation>,
    pub speed_knots: Option<f64>,
    pub direction_deg: Option<f64>,
}

/// Wind panel combining the speed and direction endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindPanel {
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub mean_speed_knots: Option<f64>,
    pub mean_speed_kmh: Option<f64>,
    pub mean_speed_ms: Option<f64>,
    /// Circular mean of station directions
    pub mean_direction_deg: Option<f64>,
    pub compass: Option<String>,
    pub stations: Vec<WindStation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningPanel {
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub strike_count: usize,
    pub strikes: Vec<LightningStrike>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbgtPanel {
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub max_wbgt: Option<f64>,
    pub highest_heat_stress: Option<HeatStress>,
    pub readings: Vec<WbgtReading>,
}

/// Everything a dashboard renders for one load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub area: Option<String>,
    pub date: Option<ReadingDate>,
    pub forecast: Section<ForecastPanel>,
    pub temperature: Section<MetricPanel>,
    pub humidity: Section<MetricPanel>,
    pub wind: Section<WindPanel>,
    pub lightning: Section<LightningPanel>,
    pub wbgt: Section<WbgtPanel>,
}

impl DashboardSnapshot {
    /// Number of sections whose source failed
    #[must_use]
    pub fn failed_sections(&self) -> usize {
        [
            self.forecast.is_failed(),
            self.temperature.is_failed(),
            self.humidity.is_failed(),
            self.wind.is_failed(),
            self.lightning.is_failed(),
            self.wbgt.is_failed(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// The dashboard hub
pub struct DashboardService {
    port: Arc<dyn WeatherDataPort>,
    config: DashboardConfig,
}

impl std::fmt::Debug for DashboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardService")
            .field("port", &"<WeatherDataPort>")
            .field("config", &self.config)
            .finish()
    }
}

impl DashboardService {
    #[must_use]
    pub fn new(port: Arc<dyn WeatherDataPort>) -> Self {
        Self {
            port,
            config: DashboardConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Load every source in parallel and build the snapshot
    #[instrument(skip(self))]
    pub async fn snapshot(&self, request: &DashboardRequest) -> DashboardSnapshot {
        let query = ReadingQuery {
            date: request.date,
            pagination_token: None,
        };
        let port = &self.port;

        let (forecast, temperature, humidity, wind_speed, wind_direction, lightning, wbgt) = tokio::join!(
            self.fetch("forecast", port.two_hour_forecast(&query)),
            self.fetch(
                "air-temperature",
                port.station_readings(StationMetric::AirTemperature, &query)
            ),
            self.fetch(
                "relative-humidity",
                port.station_readings(StationMetric::RelativeHumidity, &query)
            ),
            self.fetch(
                "wind-speed",
                port.station_readings(StationMetric::WindSpeed, &query)
            ),
            self.fetch(
                "wind-direction",
                port.station_readings(StationMetric::WindDirection, &query)
            ),
            self.fetch("lightning", port.lightning(&query)),
            self.fetch("wbgt", port.wbgt(&query)),
        );

        let area = request.area.as_deref();
        let snapshot = DashboardSnapshot {
            generated_at: Utc::now(),
            area: request.area.clone(),
            date: request.date,
            forecast: Self::forecast_panel(forecast, area),
            temperature: Self::metric_panel(StationMetric::AirTemperature, temperature),
            humidity: Self::metric_panel(StationMetric::RelativeHumidity, humidity),
            wind: Self::wind_panel(wind_speed, wind_direction),
            lightning: Self::lightning_panel(lightning),
            wbgt: Self::wbgt_panel(wbgt),
        };

        debug!(
            failed = snapshot.failed_sections(),
            "Dashboard snapshot assembled"
        );
        snapshot
    }

    /// Run one source under the configured timeout
    async fn fetch<T, F>(&self, source: &'static str, request: F) -> Section<T>
    where
        F: Future<Output = Result<T, ApplicationError>>,
    {
        let limit = self.config.source_timeout();
        match timeout(limit, request).await {
            Ok(result) => {
                if let Err(ref e) = result {
                    warn!(source, error = %e, "Dashboard source failed");
                }
                Section::from_result(result)
            },
            Err(_) => {
                warn!(source, timeout_secs = limit.as_secs(), "Dashboard source timed out");
                Section::Failed {
                    error: format!("{source} timed out after {}s", limit.as_secs()),
                }
            },
        }
    }

    fn forecast_panel(
        section: Section<TwoHourForecast>,
        area: Option<&str>,
    ) -> Section<ForecastPanel> {
        let data = match section {
            Section::Ready { data } => data,
            Section::NoData { message } => return Section::NoData { message },
            Section::Failed { error } => return Section::Failed { error },
        };
        let areas = data.area_forecasts(area);
        if areas.is_empty() {
            return Section::NoData {
                message: area.map_or_else(
                    || "No forecast published".to_string(),
                    |a| format!("No forecast for area matching '{a}'"),
                ),
            };
        }
        let latest = data.latest_item();
        Section::Ready {
            data: ForecastPanel {
                valid_period: latest.map(|item| item.valid_period.clone()),
                updated_at: latest.map(|item| item.updated_timestamp),
                areas,
            },
        }
    }

    fn metric_panel(
        metric: StationMetric,
        section: Section<StationReadings>,
    ) -> Section<MetricPanel> {
        match section {
            Section::Ready { data } if data.is_empty() => Section::NoData {
                message: format!("No {} readings", metric.label().to_lowercase()),
            },
            other => other.map(|readings| {
                let stations = readings.latest_observations();
                MetricPanel {
                    metric,
                    unit: readings.reading_unit.clone(),
                    observed_at: readings.latest().map(|r| r.timestamp),
                    stats: ReadingStats::from_values(stations.iter().map(|s| s.value)),
                    stations,
                }
            }),
        }
    }

    fn wind_panel(
        speed: Section<StationReadings>,
        direction: Section<StationReadings>,
    ) -> Section<WindPanel> {
        let speed = Self::non_empty(speed, "No wind speed readings");
        let direction = Self::non_empty(direction, "No wind direction readings");

        // A failed source fails the panel even when the other one answered
        match (speed, direction) {
            (Section::Failed { error: speed }, Section::Failed { error: direction }) => {
                Section::Failed {
                    error: format!("wind speed: {speed}; wind direction: {direction}"),
                }
            },
            (Section::Failed { error }, _) => Section::Failed {
                error: format!("wind speed: {error}"),
            },
            (_, Section::Failed { error }) => Section::Failed {
                error: format!("wind direction: {error}"),
            },
            (Section::NoData { message }, Section::NoData { .. }) => Section::NoData { message },
            (speed, direction) => Section::Ready {
                data: Self::build_wind(speed.data(), direction.data()),
            },
        }
    }

    fn build_wind(
        speed: Option<&StationReadings>,
        direction: Option<&StationReadings>,
    ) -> WindPanel {
        let speeds = speed.map(StationReadings::latest_observations).unwrap_or_default();
        let directions = direction
            .map(StationReadings::latest_observations)
            .unwrap_or_default();

        let mean_speed = ReadingStats::from_values(speeds.iter().map(|s| s.value)).map(|s| s.mean);
        let mean_direction = circular_mean_degrees(directions.iter().map(|d| d.value));

        let mut stations: Vec<WindStation> = speeds
            .iter()
            .map(|s| WindStation {
                station_id: s.station_id.clone(),
                name: s.name.clone(),
                location: s.location,
                speed_knots: Some(s.value),
                direction_deg: directions
                    .iter()
                    .find(|d| d.station_id == s.station_id)
                    .map(|d| d.value),
            })
            .collect();
        stations.extend(
            directions
                .iter()
                .filter(|d| !speeds.iter().any(|s| s.station_id == d.station_id))
                .map(|d| WindStation {
                    station_id: d.station_id.clone(),
                    name: d.name.clone(),
                    location: d.location,
                    speed_knots: None,
                    direction_deg: Some(d.value),
                }),
        );

        WindPanel {
            observed_at: speed
                .and_then(StationReadings::latest)
                .or_else(|| direction.and_then(StationReadings::latest))
                .map(|r| r.timestamp),
            mean_speed_knots: mean_speed,
            mean_speed_kmh: mean_speed.map(knots_to_kmh),
            mean_speed_ms: mean_speed.map(knots_to_ms),
            mean_direction_deg: mean_direction,
            compass: mean_direction.map(|d| compass_point(d).to_string()),
            stations,
        }
    }

    fn lightning_panel(section: Section<LightningReport>) -> Section<LightningPanel> {
        match section {
            Section::Ready { data } if data.is_empty() => Section::NoData {
                message: "No lightning observations".to_string(),
            },
            other => other.map(|report| {
                let latest = report.latest();
                LightningPanel {
                    observed_at: latest.map(|o| o.observed_at),
                    strike_count: latest.map_or(0, |o| o.strikes.len()),
                    strikes: latest.map(|o| o.strikes.clone()).unwrap_or_default(),
                }
            }),
        }
    }

    fn wbgt_panel(section: Section<WbgtReport>) -> Section<WbgtPanel> {
        match section {
            Section::Ready { data } if data.is_empty() => Section::NoData {
                message: "No WBGT readings".to_string(),
            },
            other => other.map(|report| WbgtPanel {
                observed_at: report.latest().map(|o| o.observed_at),
                max_wbgt: report.max_wbgt(),
                highest_heat_stress: report.highest_heat_stress(),
                readings: report.latest().map(|o| o.readings.clone()).unwrap_or_default(),
            }),
        }
    }

    fn non_empty(section: Section<StationReadings>, message: &str) -> Section<StationReadings> {
        match section {
            Section::Ready { data } if data.is_empty() => Section::NoData {
                message: message.to_string(),
            },
            other => other,
        }
    }
}
