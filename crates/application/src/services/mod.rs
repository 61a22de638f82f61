//! Application services

mod dashboard_service;
mod health_service;
mod weather_service;

pub use dashboard_service::{
    DashboardConfig, DashboardRequest, DashboardService, DashboardSnapshot, ForecastPanel,
    LightningPanel, MetricPanel, Section, WbgtPanel, WindPanel, WindStation,
};
pub use health_service::{HealthConfig, HealthReport, HealthService, ServiceHealth};
pub use weather_service::{NearestForecast, WeatherService};
