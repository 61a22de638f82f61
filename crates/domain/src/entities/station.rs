//! Station reading entities
//!
//! Air temperature, relative humidity, wind speed, wind direction and
//! rainfall all share this shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::GeoLocation;

/// Station-based real-time metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StationMetric {
    AirTemperature,
    RelativeHumidity,
    WindSpeed,
    WindDirection,
    Rainfall,
}

impl StationMetric {
    pub const ALL: [Self; 5] = [
        Self::AirTemperature,
        Self::RelativeHumidity,
        Self::WindSpeed,
        Self::WindDirection,
        Self::Rainfall,
    ];

    /// URL slug, also the upstream path segment
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::AirTemperature => "air-temperature",
            Self::RelativeHumidity => "relative-humidity",
            Self::WindSpeed => "wind-speed",
            Self::WindDirection => "wind-direction",
            Self::Rainfall => "rainfall",
        }
    }

    /// Upstream endpoint path relative to the API base URL
    #[must_use]
    pub fn path(self) -> String {
        format!("/{}", self.slug())
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AirTemperature => "Air temperature",
            Self::RelativeHumidity => "Relative humidity",
            Self::WindSpeed => "Wind speed",
            Self::WindDirection => "Wind direction",
            Self::Rainfall => "Rainfall",
        }
    }
}

impl fmt::Display for StationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for StationMetric {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|m| m.slug() == normalised)
            .ok_or_else(|| DomainError::UnknownMetric(s.to_string()))
    }
}

/// A weather station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub device_id: String,
    pub name: String,
    pub location: GeoLocation,
}

/// A single station's value within a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationValue {
    pub station_id: String,
    pub value: f64,
}

/// All station values at one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    pub timestamp: DateTime<FixedOffset>,
    pub data: Vec<StationValue>,
}

/// A station value joined with station metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationObservation {
    pub station_id: String,
    pub name: Option<String>,
    pub location: Option<GeoLocation>,
    pub value: f64,
}

/// Response of a station reading endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationReadings {
    pub stations: Vec<Station>,
    pub readings: Vec<StationReading>,
    pub reading_type: Option<String>,
    pub reading_unit: Option<String>,
    pub pagination_token: Option<String>,
}

impl StationReadings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.iter().all(|r| r.data.is_empty())
    }

    /// Most recent reading that carries at least one value
    #[must_use]
    pub fn latest(&self) -> Option<&StationReading> {
        self.readings
            .iter()
            .filter(|r| !r.data.is_empty())
            .max_by_key(|r| r.timestamp)
    }

    /// Station metadata by id
    #[must_use]
    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Values of the latest reading joined with station name and location
    ///
    /// Values from stations missing in the metadata are kept without location.
    #[must_use]
    pub fn latest_observations(&self) -> Vec<StationObservation> {
        self.latest()
            .map(|reading| {
                reading
                    .data
                    .iter()
                    .map(|value| {
                        let station = self.station(&value.station_id);
                        StationObservation {
                            station_id: value.station_id.clone(),
                            name: station.map(|s| s.name.clone()),
                            location: station.map(|s| s.location),
                            value: value.value,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(timestamp: &str, values: &[(&str, f64)]) -> StationReading {
        StationReading {
            timestamp: DateTime::parse_from_rfc3339(timestamp).unwrap(),
            data: values
                .iter()
                .map(|(id, value)| StationValue {
                    station_id: (*id).to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    fn sample() -> StationReadings {
        StationReadings {
            stations: vec![Station {
                id: "S109".to_string(),
                device_id: "S109".to_string(),
                name: "Ang Mo Kio Avenue 5".to_string(),
                location: GeoLocation::new_unchecked(1.3764, 103.8492),
            }],
            readings: vec![
                reading("2024-07-15T14:05:00+08:00", &[("S109", 31.2), ("S999", 30.1)]),
                reading("2024-07-15T14:00:00+08:00", &[("S109", 30.8)]),
            ],
            reading_type: Some("DBT 1M F".to_string()),
            reading_unit: Some("deg C".to_string()),
            pagination_token: None,
        }
    }

    #[test]
    fn metric_paths() {
        assert_eq!(StationMetric::AirTemperature.path(), "/air-temperature");
        assert_eq!(StationMetric::RelativeHumidity.path(), "/relative-humidity");
        assert_eq!(StationMetric::WindSpeed.path(), "/wind-speed");
        assert_eq!(StationMetric::WindDirection.path(), "/wind-direction");
        assert_eq!(StationMetric::Rainfall.path(), "/rainfall");
    }

    #[test]
    fn metric_from_str_accepts_slug_and_snake_case() {
        assert_eq!(
            "wind-speed".parse::<StationMetric>().unwrap(),
            StationMetric::WindSpeed
        );
        assert_eq!(
            "AIR_TEMPERATURE".parse::<StationMetric>().unwrap(),
            StationMetric::AirTemperature
        );
        assert!(matches!(
            "pressure".parse::<StationMetric>(),
            Err(DomainError::UnknownMetric(_))
        ));
    }

    #[test]
    fn metric_serializes_as_slug() {
        let json = serde_json::to_string(&StationMetric::WindDirection).unwrap();
        assert_eq!(json, "\"wind-direction\"");
    }

    #[test]
    fn latest_picks_newest_reading() {
        let readings = sample();
        assert_eq!(readings.latest().unwrap().data.len(), 2);
    }

    #[test]
    fn latest_skips_readings_without_values() {
        let mut readings = sample();
        readings
            .readings
            .push(reading("2024-07-15T14:10:00+08:00", &[]));

        let latest = readings.latest().unwrap();
        assert_eq!(latest.timestamp.to_rfc3339(), "2024-07-15T14:05:00+08:00");
        assert_eq!(readings.latest_observations().len(), 2);
    }

    #[test]
    fn latest_observations_join_station_metadata() {
        let observations = sample().latest_observations();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].name.as_deref(), Some("Ang Mo Kio Avenue 5"));
        assert!(observations[0].location.is_some());
        assert!(observations[1].name.is_none());
    }

    #[test]
    fn empty_readings() {
        let readings = StationReadings::default();
        assert!(readings.is_empty());
        assert!(readings.latest().is_none());
        assert!(readings.latest_observations().is_empty());
    }
}
