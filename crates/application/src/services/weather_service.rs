//! Weather service
//!
//! Thin per-endpoint wrapper over the weather data port, plus the
//! area lookups built on the two-hour forecast.

use std::sync::Arc;

use domain::{
    AreaForecast, AreaMetadata, DomainError, ForecastPeriod, GeoLocation, LightningReport,
    ReadingQuery, StationMetric, StationReadings, TwoHourForecast, WbgtReport,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{error::ApplicationError, ports::WeatherDataPort};

/// Forecast for the area closest to a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestForecast {
    /// The requested location
    pub location: GeoLocation,
    pub distance_km: f64,
    pub forecast: AreaForecast,
    pub valid_period: Option<ForecastPeriod>,
}

/// Service for weather data queries
pub struct WeatherService {
    port: Arc<dyn WeatherDataPort>,
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("port", &"<WeatherDataPort>")
            .finish()
    }
}

impl WeatherService {
    #[must_use]
    pub fn new(port: Arc<dyn WeatherDataPort>) -> Self {
        Self { port }
    }

    #[instrument(skip(self))]
    pub async fn two_hour_forecast(
        &self,
        query: &ReadingQuery,
    ) -> Result<TwoHourForecast, ApplicationError> {
        let forecast = self.port.two_hour_forecast(query).await?;
        debug!(
            areas = forecast.area_metadata.len(),
            items = forecast.items.len(),
            "Fetched two-hour forecast"
        );
        Ok(forecast)
    }

    #[instrument(skip(self), fields(metric = %metric))]
    pub async fn station_readings(
        &self,
        metric: StationMetric,
        query: &ReadingQuery,
    ) -> Result<StationReadings, ApplicationError> {
        let readings = self.port.station_readings(metric, query).await?;
        debug!(
            stations = readings.stations.len(),
            readings = readings.readings.len(),
            "Fetched station readings"
        );
        Ok(readings)
    }

    #[instrument(skip(self))]
    pub async fn lightning(&self, query: &ReadingQuery) -> Result<LightningReport, ApplicationError> {
        let report = self.port.lightning(query).await?;
        debug!(strikes = report.strike_count(), "Fetched lightning observations");
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn wbgt(&self, query: &ReadingQuery) -> Result<WbgtReport, ApplicationError> {
        let report = self.port.wbgt(query).await?;
        debug!(observations = report.observations.len(), "Fetched WBGT readings");
        Ok(report)
    }

    /// Forecast areas whose name contains `filter` (all areas when `None`)
    #[instrument(skip(self))]
    pub async fn areas(&self, filter: Option<&str>) -> Result<Vec<AreaMetadata>, ApplicationError> {
        let forecast = self.port.two_hour_forecast(&ReadingQuery::latest()).await?;
        Ok(forecast
            .filter_areas(filter.unwrap_or_default())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Latest forecasts for areas matching `area`
    ///
    /// A non-blank area that matches nothing is reported as not found.
    #[instrument(skip(self))]
    pub async fn area_forecast(
        &self,
        query: &ReadingQuery,
        area: Option<&str>,
    ) -> Result<Vec<AreaForecast>, ApplicationError> {
        let forecast = self.port.two_hour_forecast(query).await?;
        let forecasts = forecast.area_forecasts(area);

        match area.map(str::trim) {
            Some(name) if !name.is_empty() && forecasts.is_empty() => {
                Err(DomainError::not_found("Area", name).into())
            },
            _ => Ok(forecasts),
        }
    }

    /// Latest forecast for the area closest to `location`
    #[instrument(skip(self), fields(location = %location))]
    pub async fn nearest_forecast(
        &self,
        location: GeoLocation,
    ) -> Result<NearestForecast, ApplicationError> {
        let forecast = self.port.two_hour_forecast(&ReadingQuery::latest()).await?;

        let (area, distance_km) = forecast
            .nearest_area(&location)
            .ok_or_else(|| ApplicationError::NoData("No forecast areas published".to_string()))?;

        let latest = forecast.latest_item();
        let text = latest
            .and_then(|item| item.forecast_for(&area.name))
            .map(|f| f.forecast.clone())
            .ok_or_else(|| ApplicationError::NoData(format!("No forecast for {}", area.name)))?;

        debug!(area = %area.name, distance_km, "Resolved nearest forecast area");

        Ok(NearestForecast {
            location,
            distance_km,
            forecast: AreaForecast {
                area: area.name.clone(),
                condition: domain::ForecastCondition::from_text(&text),
                forecast: text,
                location: Some(area.label_location),
            },
            valid_period: latest.map(|item| item.valid_period.clone()),
        })
    }

    /// Check whether the upstream data source answers
    pub async fn is_available(&self) -> bool {
        self.port.is_available().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use domain::{Forecast, ForecastCondition, ForecastItem};
    use mockall::predicate::eq;

    use super::*;
    use crate::ports::MockWeatherDataPort;

    fn sample_forecast() -> TwoHourForecast {
        let ts = DateTime::parse_from_rfc3339("2024-07-15T14:00:00+08:00").unwrap();
        TwoHourForecast {
            area_metadata: vec![
                AreaMetadata {
                    name: "Changi".to_string(),
                    label_location: GeoLocation::new_unchecked(1.357, 103.987),
                },
                AreaMetadata {
                    name: "Clementi".to_string(),
                    label_location: GeoLocation::new_unchecked(1.315, 103.76),
                },
            ],
            items: vec![ForecastItem {
                updated_timestamp: ts,
                timestamp: ts,
                valid_period: ForecastPeriod {
                    start: ts,
                    end: ts,
                    text: "2 to 4 PM".to_string(),
                },
                forecasts: vec![
                    Forecast {
                        area: "Changi".to_string(),
                        forecast: "Light Showers".to_string(),
                    },
                    Forecast {
                        area: "Clementi".to_string(),
                        forecast: "Fair (Day)".to_string(),
                    },
                ],
            }],
            pagination_token: None,
        }
    }

    fn service_with_forecast() -> WeatherService {
        let mut port = MockWeatherDataPort::new();
        port.expect_two_hour_forecast()
            .returning(|_| Ok(sample_forecast()));
        WeatherService::new(Arc::new(port))
    }

    #[tokio::test]
    async fn station_readings_delegate_metric_and_query() {
        let mut port = MockWeatherDataPort::new();
        port.expect_station_readings()
            .with(eq(StationMetric::Rainfall), eq(ReadingQuery::latest()))
            .times(1)
            .returning(|_, _| Ok(StationReadings::default()));
        let service = WeatherService::new(Arc::new(port));

        let readings = service
            .station_readings(StationMetric::Rainfall, &ReadingQuery::latest())
            .await
            .unwrap();
        assert!(readings.is_empty());
    }

    #[tokio::test]
    async fn errors_propagate() {
        let mut port = MockWeatherDataPort::new();
        port.expect_lightning()
            .returning(|_| Err(ApplicationError::RateLimited));
        let service = WeatherService::new(Arc::new(port));

        let result = service.lightning(&ReadingQuery::latest()).await;
        assert!(matches!(result, Err(ApplicationError::RateLimited)));
    }

    #[tokio::test]
    async fn areas_are_filtered() {
        let service = service_with_forecast();
        let areas = service.areas(Some("chang")).await.unwrap();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].name, "Changi");
        assert_eq!(service.areas(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn area_forecast_unknown_area_is_not_found() {
        let service = service_with_forecast();
        let result = service
            .area_forecast(&ReadingQuery::latest(), Some("Tuas"))
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn area_forecast_matches_area() {
        let service = service_with_forecast();
        let forecasts = service
            .area_forecast(&ReadingQuery::latest(), Some("clementi"))
            .await
            .unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].condition, ForecastCondition::Fair);
    }

    #[tokio::test]
    async fn nearest_forecast_picks_closest_area() {
        let service = service_with_forecast();
        let airport = GeoLocation::new(1.3644, 103.9915).unwrap();
        let nearest = service.nearest_forecast(airport).await.unwrap();
        assert_eq!(nearest.forecast.area, "Changi");
        assert_eq!(nearest.forecast.condition, ForecastCondition::Showers);
        assert!(nearest.distance_km < 5.0);
        assert_eq!(nearest.valid_period.unwrap().text, "2 to 4 PM");
    }

    #[tokio::test]
    async fn nearest_forecast_without_areas_is_no_data() {
        let mut port = MockWeatherDataPort::new();
        port.expect_two_hour_forecast()
            .returning(|_| Ok(TwoHourForecast::default()));
        let service = WeatherService::new(Arc::new(port));

        let result = service.nearest_forecast(GeoLocation::singapore()).await;
        assert!(matches!(result, Err(ApplicationError::NoData(_))));
    }
}
