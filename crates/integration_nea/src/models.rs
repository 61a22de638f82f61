//! Wire models for the NEA real-time API
//!
//! The API is loosely typed: numbers sometimes arrive as strings, one
//! field is spelt `longtitude`, and the forecast item timestamp is published
//! as both `update_timestamp` and `updated_timestamp`. These types absorb
//! that and convert into the domain entities.

use chrono::{DateTime, FixedOffset};
use domain::{
    AreaMetadata, Forecast, ForecastItem, ForecastPeriod, GeoLocation, HeatStress,
    LightningObservation, LightningReport, LightningStrike, Station, StationReading,
    StationReadings, StationValue, TwoHourForecast, WbgtObservation, WbgtReading, WbgtReport,
};
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(rename = "errorMsg", default)]
    pub error_msg: Option<String>,
    pub data: Option<T>,
}

/// Body returned with non-success status codes
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    #[allow(dead_code)]
    pub code: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "errorMsg", default)]
    pub error_msg: Option<String>,
}

impl ErrorBody {
    /// Whether the body carried anything identifying the error
    pub fn is_meaningful(&self) -> bool {
        self.name.is_some() || self.error_msg.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(f64),
    Text(String),
}

impl Lenient {
    fn into_f64(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Deserialize a number that may be encoded as a string
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Lenient::deserialize(deserializer)?
        .into_f64()
        .ok_or_else(|| serde::de::Error::custom("expected a number"))
}

/// Like [`lenient_f64`], but unparseable or missing values become `None`
fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Lenient>::deserialize(deserializer)?.and_then(Lenient::into_f64))
}

/// RFC 3339 timestamp that is dropped instead of failing the whole payload
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok()))
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    #[serde(deserialize_with = "lenient_f64")]
    latitude: f64,
    #[serde(alias = "longtitude", deserialize_with = "lenient_f64")]
    longitude: f64,
}

impl WireLocation {
    fn into_domain(self) -> Option<GeoLocation> {
        match GeoLocation::new(self.latitude, self.longitude) {
            Ok(location) => Some(location),
            Err(_) => {
                warn!(
                    latitude = self.latitude,
                    longitude = self.longitude,
                    "Dropping out-of-range coordinates"
                );
                None
            },
        }
    }
}

// ============================================================================
// Two-hour forecast
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct TwoHourForecastData {
    #[serde(default)]
    area_metadata: Vec<WireAreaMetadata>,
    #[serde(default)]
    items: Vec<WireForecastItem>,
    #[serde(rename = "paginationToken", alias = "pagination_token", default)]
    pagination_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAreaMetadata {
    name: String,
    label_location: WireLocation,
}

#[derive(Debug, Deserialize)]
#[serde(try_from = "RawForecastItem")]
struct WireForecastItem {
    update_timestamp: DateTime<FixedOffset>,
    timestamp: DateTime<FixedOffset>,
    valid_period: WirePeriod,
    forecasts: Vec<WireForecast>,
}

/// Forecast item as sent; either timestamp spelling may appear, or both
#[derive(Debug, Deserialize)]
struct RawForecastItem {
    #[serde(default)]
    update_timestamp: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    updated_timestamp: Option<DateTime<FixedOffset>>,
    timestamp: DateTime<FixedOffset>,
    valid_period: WirePeriod,
    #[serde(default)]
    forecasts: Vec<WireForecast>,
}

impl TryFrom<RawForecastItem> for WireForecastItem {
    type Error = String;

    fn try_from(raw: RawForecastItem) -> Result<Self, Self::Error> {
        let update_timestamp = raw
            .update_timestamp
            .or(raw.updated_timestamp)
            .ok_or_else(|| "missing update_timestamp".to_string())?;
        Ok(Self {
            update_timestamp,
            timestamp: raw.timestamp,
            valid_period: raw.valid_period,
            forecasts: raw.forecasts,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WirePeriod {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct WireForecast {
    area: String,
    forecast: WireForecastText,
}

/// Forecast phrase, either plain or as `{ code, text }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireForecastText {
    Plain(String),
    Coded { text: String },
}

impl From<WireForecastText> for String {
    fn from(value: WireForecastText) -> Self {
        match value {
            WireForecastText::Plain(text) | WireForecastText::Coded { text } => text,
        }
    }
}

impl From<TwoHourForecastData> for TwoHourForecast {
    fn from(data: TwoHourForecastData) -> Self {
        let area_metadata = data
            .area_metadata
            .into_iter()
            .filter_map(|area| {
                area.label_location.into_domain().map(|label_location| AreaMetadata {
                    name: area.name,
                    label_location,
                })
            })
            .collect();

        let items = data
            .items
            .into_iter()
            .map(|item| ForecastItem {
                updated_timestamp: item.update_timestamp,
                timestamp: item.timestamp,
                valid_period: ForecastPeriod {
                    start: item.valid_period.start,
                    end: item.valid_period.end,
                    text: item.valid_period.text,
                },
                forecasts: item
                    .forecasts
                    .into_iter()
                    .map(|f| Forecast {
                        area: f.area,
                        forecast: f.forecast.into(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            area_metadata,
            items,
            pagination_token: data.pagination_token,
        }
    }
}

// ============================================================================
// Station readings
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StationReadingsData {
    #[serde(default)]
    stations: Vec<WireStation>,
    #[serde(default)]
    readings: Vec<WireReading>,
    #[serde(default)]
    reading_type: Option<String>,
    #[serde(default)]
    reading_unit: Option<String>,
    #[serde(default)]
    pagination_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStation {
    id: String,
    #[serde(default, alias = "device_id")]
    device_id: Option<String>,
    name: String,
    location: WireLocation,
}

#[derive(Debug, Deserialize)]
struct WireReading {
    timestamp: DateTime<FixedOffset>,
    #[serde(default)]
    data: Vec<WireStationValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStationValue {
    #[serde(alias = "station_id")]
    station_id: String,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    value: Option<f64>,
}

impl From<StationReadingsData> for StationReadings {
    fn from(data: StationReadingsData) -> Self {
        let stations = data
            .stations
            .into_iter()
            .filter_map(|s| {
                let location = s.location.into_domain()?;
                Some(Station {
                    device_id: s.device_id.unwrap_or_else(|| s.id.clone()),
                    id: s.id,
                    name: s.name,
                    location,
                })
            })
            .collect();

        let readings = data
            .readings
            .into_iter()
            .map(|r| StationReading {
                timestamp: r.timestamp,
                data: r
                    .data
                    .into_iter()
                    .filter_map(|v| {
                        v.value.map(|value| StationValue {
                            station_id: v.station_id,
                            value,
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            stations,
            readings,
            reading_type: data.reading_type,
            reading_unit: data.reading_unit,
            pagination_token: data.pagination_token,
        }
    }
}

// ============================================================================
// Lightning
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LightningData {
    #[serde(default)]
    records: Vec<WireLightningRecord>,
    #[serde(default)]
    pagination_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLightningRecord {
    datetime: DateTime<FixedOffset>,
    #[serde(default)]
    item: Option<WireLightningItem>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    updated_timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Deserialize)]
struct WireLightningItem {
    #[serde(default)]
    readings: Option<Vec<WireLightningReading>>,
}

#[derive(Debug, Deserialize)]
struct WireLightningReading {
    location: WireLocation,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    datetime: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl From<LightningData> for LightningReport {
    fn from(data: LightningData) -> Self {
        let observations = data
            .records
            .into_iter()
            .map(|record| LightningObservation {
                observed_at: record.datetime,
                updated_at: record.updated_timestamp,
                strikes: record
                    .item
                    .and_then(|item| item.readings)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|r| {
                        Some(LightningStrike {
                            location: r.location.into_domain()?,
                            observed_at: r.datetime,
                            text: r.text,
                            kind: r.kind,
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            observations,
            pagination_token: data.pagination_token,
        }
    }
}

// ============================================================================
// WBGT
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WbgtData {
    #[serde(default)]
    records: Vec<WireWbgtRecord>,
    #[serde(default)]
    pagination_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWbgtRecord {
    datetime: DateTime<FixedOffset>,
    #[serde(default)]
    item: Option<WireWbgtItem>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    updated_timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Deserialize)]
struct WireWbgtItem {
    #[serde(default)]
    readings: Option<Vec<WireWbgtReading>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWbgtReading {
    #[serde(default)]
    location: Option<WireLocation>,
    station: WireWbgtStation,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    wbgt: Option<f64>,
    #[serde(default)]
    heat_stress: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWbgtStation {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    town_center: Option<String>,
}

impl From<WbgtData> for WbgtReport {
    fn from(data: WbgtData) -> Self {
        let observations = data
            .records
            .into_iter()
            .map(|record| WbgtObservation {
                observed_at: record.datetime,
                updated_at: record.updated_timestamp,
                readings: record
                    .item
                    .and_then(|item| item.readings)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|r| WbgtReading {
                        station_id: r.station.id,
                        station_name: r.station.name,
                        town_center: r.station.town_center,
                        location: r.location.and_then(WireLocation::into_domain),
                        wbgt: r.wbgt,
                        heat_stress: r
                            .heat_stress
                            .as_deref()
                            .map_or(HeatStress::Unknown, HeatStress::from_text),
                    })
                    .collect(),
            })
            .collect();

        Self {
            observations,
            pagination_token: data.pagination_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_accepts_both_timestamp_spellings() {
        let json = r#"{
            "area_metadata": [{"name": "Bedok", "label_location": {"latitude": 1.321, "longitude": 103.924}}],
            "items": [
                {
                    "update_timestamp": "2024-07-15T14:10:00+08:00",
                    "timestamp": "2024-07-15T14:00:00+08:00",
                    "valid_period": {"start": "2024-07-15T14:00:00+08:00", "end": "2024-07-15T16:00:00+08:00", "text": "2 to 4 PM"},
                    "forecasts": [{"area": "Bedok", "forecast": "Cloudy"}]
                },
                {
                    "updated_timestamp": "2024-07-15T16:10:00+08:00",
                    "timestamp": "2024-07-15T16:00:00+08:00",
                    "valid_period": {"start": "2024-07-15T16:00:00+08:00", "end": "2024-07-15T18:00:00+08:00", "text": "4 to 6 PM"},
                    "forecasts": [{"area": "Bedok", "forecast": {"code": "TL", "text": "Thundery Showers"}}]
                }
            ],
            "paginationToken": null
        }"#;
        let data: TwoHourForecastData = serde_json::from_str(json).unwrap();
        let forecast = TwoHourForecast::from(data);
        assert_eq!(forecast.items.len(), 2);
        assert_eq!(forecast.items[1].forecasts[0].forecast, "Thundery Showers");
        assert_eq!(forecast.area_metadata[0].name, "Bedok");
    }

    #[test]
    fn forecast_item_with_both_timestamp_spellings() {
        let json = r#"{
            "items": [{
                "update_timestamp": "2024-07-15T14:10:00+08:00",
                "updated_timestamp": "2024-07-15T14:12:00+08:00",
                "timestamp": "2024-07-15T14:00:00+08:00",
                "valid_period": {"start": "2024-07-15T14:00:00+08:00", "end": "2024-07-15T16:00:00+08:00", "text": "2 to 4 PM"},
                "forecasts": [{"area": "Bedok", "forecast": "Cloudy"}]
            }]
        }"#;
        let data: TwoHourForecastData = serde_json::from_str(json).unwrap();
        let forecast = TwoHourForecast::from(data);
        assert_eq!(
            forecast.items[0].updated_timestamp,
            DateTime::parse_from_rfc3339("2024-07-15T14:10:00+08:00").unwrap()
        );
    }

    #[test]
    fn forecast_item_without_update_timestamp_is_rejected() {
        let json = r#"{
            "items": [{
                "timestamp": "2024-07-15T14:00:00+08:00",
                "valid_period": {"start": "2024-07-15T14:00:00+08:00", "end": "2024-07-15T16:00:00+08:00"}
            }]
        }"#;
        let err = serde_json::from_str::<TwoHourForecastData>(json).unwrap_err();
        assert!(err.to_string().contains("missing update_timestamp"));
    }

    #[test]
    fn envelope_without_data_field() {
        let envelope: Envelope<WbgtData> = serde_json::from_str(r#"{"code": 0}"#).unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn station_values_may_be_strings() {
        let json = r#"{
            "stations": [{"id": "S109", "deviceId": "S109", "name": "Ang Mo Kio Avenue 5",
                          "location": {"latitude": "1.3764", "longitude": 103.8492}}],
            "readings": [{"timestamp": "2024-07-15T14:05:00+08:00",
                          "data": [{"stationId": "S109", "value": "31.2"}, {"stationId": "S24", "value": null}]}],
            "readingType": "DBT 1M F",
            "readingUnit": "deg C"
        }"#;
        let data: StationReadingsData = serde_json::from_str(json).unwrap();
        let readings = StationReadings::from(data);
        assert_eq!(readings.stations.len(), 1);
        let latest = readings.latest().unwrap();
        assert_eq!(latest.data.len(), 1);
        assert!((latest.data[0].value - 31.2).abs() < f64::EPSILON);
        assert_eq!(readings.reading_unit.as_deref(), Some("deg C"));
    }

    #[test]
    fn lightning_accepts_misspelt_longitude() {
        let json = r#"{
            "records": [{
                "datetime": "2024-07-15T14:00:00+08:00",
                "item": {"type": "observation", "isStationData": false, "readings": [
                    {"location": {"latitude": "1.35", "longtitude": "103.82"},
                     "datetime": "2024-07-15T13:58:12+08:00", "text": "Cloud to Ground", "type": "G"}
                ]},
                "updatedTimestamp": "2024-07-15T14:01:00+08:00"
            }]
        }"#;
        let data: LightningData = serde_json::from_str(json).unwrap();
        let report = LightningReport::from(data);
        assert_eq!(report.strike_count(), 1);
        let strike = &report.observations[0].strikes[0];
        assert!((strike.location.longitude() - 103.82).abs() < f64::EPSILON);
        assert_eq!(strike.kind.as_deref(), Some("G"));
    }

    #[test]
    fn lightning_without_readings_is_an_empty_observation() {
        let json = r#"{"records": [{"datetime": "2024-07-15T14:00:00+08:00",
                        "item": {"type": "observation", "readings": null},
                        "updatedTimestamp": "2024-07-15T14:01:00+08:00"}]}"#;
        let data: LightningData = serde_json::from_str(json).unwrap();
        let report = LightningReport::from(data);
        assert_eq!(report.observations.len(), 1);
        assert_eq!(report.strike_count(), 0);
    }

    #[test]
    fn wbgt_parses_string_values_and_heat_stress() {
        let json = r#"{
            "records": [{
                "datetime": "2024-07-15T14:00:00+08:00",
                "item": {"isStationData": true, "type": "observation", "readings": [
                    {"location": {"latitude": "1.3", "longitude": "103.8"},
                     "station": {"id": "S128", "name": "Bishan Street", "townCenter": "Bishan"},
                     "wbgt": "30.6", "heatStress": "Moderate"},
                    {"station": {"id": "S129", "name": "Marine Parade"},
                     "wbgt": "", "heatStress": "Low"}
                ]},
                "updatedTimestamp": "2024-07-15T14:02:00+08:00"
            }]
        }"#;
        let data: WbgtData = serde_json::from_str(json).unwrap();
        let report = WbgtReport::from(data);
        let readings = &report.observations[0].readings;
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].town_center.as_deref(), Some("Bishan"));
        assert_eq!(readings[0].heat_stress, HeatStress::Moderate);
        assert!(readings[1].wbgt.is_none());
        assert_eq!(report.highest_heat_stress(), Some(HeatStress::Moderate));
    }

    #[test]
    fn envelope_with_null_data() {
        let json = r#"{"code": 0, "errorMsg": null, "data": null}"#;
        let envelope: Envelope<WbgtData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 0);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn error_body_fields() {
        let json = r#"{"code": 4, "name": "ERROR_PARAMS", "data": null, "errorMsg": "Invalid date format"}"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert!(body.is_meaningful());
        assert_eq!(body.name.as_deref(), Some("ERROR_PARAMS"));
    }
}
