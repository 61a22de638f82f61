//! Weather data port
//!
//! Defines the interface for retrieving NEA real-time weather data.

use async_trait::async_trait;
use domain::{
    LightningReport, ReadingQuery, StationMetric, StationReadings, TwoHourForecast, WbgtReport,
};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for weather data retrieval, one method per upstream endpoint
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherDataPort: Send + Sync {
    /// Two-hour area forecast
    async fn two_hour_forecast(
        &self,
        query: &ReadingQuery,
    ) -> Result<TwoHourForecast, ApplicationError>;

    /// Station readings for a metric
    async fn station_readings(
        &self,
        metric: StationMetric,
        query: &ReadingQuery,
    ) -> Result<StationReadings, ApplicationError>;

    /// Lightning observations
    async fn lightning(&self, query: &ReadingQuery) -> Result<LightningReport, ApplicationError>;

    /// Wet-bulb globe temperature readings
    async fn wbgt(&self, query: &ReadingQuery) -> Result<WbgtReport, ApplicationError>;

    /// Check if the weather data source is available
    async fn is_available(&self) -> bool;
}
