//! Weather data handlers
//!
//! Per-endpoint proxies over the NEA data plus area lookups for map views.

use application::NearestForecast;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use domain::{
    AreaForecast, AreaMetadata, GeoLocation, LightningReport, ReadingQuery, StationMetric,
    StationReadings, TwoHourForecast, WbgtReport,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

/// `date` and `pagination_token` query parameters shared by the proxies
#[derive(Debug, Default, Deserialize)]
pub struct ReadingParams {
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`; latest data when absent
    pub date: Option<String>,
    pub pagination_token: Option<String>,
}

impl ReadingParams {
    fn into_query(self) -> Result<ReadingQuery, ApiError> {
        Ok(ReadingQuery::from_raw(
            self.date.as_deref(),
            self.pagination_token.as_deref(),
        )?)
    }
}

/// Unwrap query parameters, turning rejections into JSON 400s
pub(crate) fn params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query.map(|Query(params)| params).map_err(ApiError::from)
}

/// Two-hour forecast as published
#[instrument(skip(state))]
pub async fn two_hour_forecast(
    State(state): State<AppState>,
    query: Result<Query<ReadingParams>, QueryRejection>,
) -> Result<Json<TwoHourForecast>, ApiError> {
    let query = params(query)?.into_query()?;
    Ok(Json(state.weather_service.two_hour_forecast(&query).await?))
}

/// Station readings for one metric, e.g. `/v1/weather/stations/air-temperature`
#[instrument(skip(state))]
pub async fn station_readings(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    query: Result<Query<ReadingParams>, QueryRejection>,
) -> Result<Json<StationReadings>, ApiError> {
    let metric: StationMetric = metric.parse()?;
    let query = params(query)?.into_query()?;
    Ok(Json(
        state
            .weather_service
            .station_readings(metric, &query)
            .await?,
    ))
}

#[instrument(skip(state))]
pub async fn lightning(
    State(state): State<AppState>,
    query: Result<Query<ReadingParams>, QueryRejection>,
) -> Result<Json<LightningReport>, ApiError> {
    let query = params(query)?.into_query()?;
    Ok(Json(state.weather_service.lightning(&query).await?))
}

#[instrument(skip(state))]
pub async fn wbgt(
    State(state): State<AppState>,
    query: Result<Query<ReadingParams>, QueryRejection>,
) -> Result<Json<WbgtReport>, ApiError> {
    let query = params(query)?.into_query()?;
    Ok(Json(state.weather_service.wbgt(&query).await?))
}

/// Area name filter
#[derive(Debug, Default, Deserialize)]
pub struct AreasParams {
    /// Case-insensitive substring of the area name
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AreasResponse {
    pub count: usize,
    pub areas: Vec<AreaMetadata>,
}

/// Forecast areas with their label locations (map markers)
#[instrument(skip(state))]
pub async fn areas(
    State(state): State<AppState>,
    query: Result<Query<AreasParams>, QueryRejection>,
) -> Result<Json<AreasResponse>, ApiError> {
    let filter = params(query)?.q;
    let areas = state.weather_service.areas(filter.as_deref()).await?;
    Ok(Json(AreasResponse {
        count: areas.len(),
        areas,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct AreaForecastParams {
    pub area: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AreaForecastResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub forecasts: Vec<AreaForecast>,
}

/// Latest per-area forecasts, optionally filtered by area name
#[instrument(skip(state))]
pub async fn area_forecast(
    State(state): State<AppState>,
    query: Result<Query<AreaForecastParams>, QueryRejection>,
) -> Result<Json<AreaForecastResponse>, ApiError> {
    let AreaForecastParams { area, date } = params(query)?;
    let query = ReadingQuery::from_raw(date.as_deref(), None)?;
    let area = area.filter(|a| !a.trim().is_empty());

    let forecasts = state
        .weather_service
        .area_forecast(&query, area.as_deref())
        .await?;
    Ok(Json(AreaForecastResponse { area, forecasts }))
}

#[derive(Debug, Deserialize)]
pub struct NearestParams {
    pub latitude: f64,
    pub longitude: f64,
}

/// Forecast for the area closest to a coordinate
#[instrument(skip(state))]
pub async fn nearest_forecast(
    State(state): State<AppState>,
    query: Result<Query<NearestParams>, QueryRejection>,
) -> Result<Json<NearestForecast>, ApiError> {
    let NearestParams {
        latitude,
        longitude,
    } = params(query)?;
    let location = GeoLocation::new(latitude, longitude)?;
    Ok(Json(state.weather_service.nearest_forecast(location).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_params_build_latest_query() {
        let query = ReadingParams::default().into_query().unwrap();
        assert_eq!(query, ReadingQuery::latest());
    }

    #[test]
    fn reading_params_reject_bad_dates() {
        let params = ReadingParams {
            date: Some("15/07/2024".to_string()),
            pagination_token: None,
        };
        assert!(matches!(params.into_query(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn reading_params_keep_token() {
        let query = ReadingParams {
            date: Some("2024-07-15".to_string()),
            pagination_token: Some("page-2".to_string()),
        }
        .into_query()
        .unwrap();
        assert_eq!(query.pagination_token.as_deref(), Some("page-2"));
        assert!(query.date.is_some());
    }
}
