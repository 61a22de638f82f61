//! Two-hour area forecast entities

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::value_objects::GeoLocation;

/// A forecast area and the point where its label is drawn on a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaMetadata {
    /// Area name, e.g. "Ang Mo Kio"
    pub name: String,
    /// Label location of the area
    pub label_location: GeoLocation,
}

/// Time window a forecast item applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Human readable period, e.g. "2 to 4 PM"
    pub text: String,
}

/// Free-text forecast for one area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub area: String,
    pub forecast: String,
}

impl Forecast {
    /// Condition category derived from the forecast text
    #[must_use]
    pub fn condition(&self) -> ForecastCondition {
        ForecastCondition::from_text(&self.forecast)
    }
}

/// Coarse weather category for NEA forecast phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastCondition {
    Fair,
    Cloudy,
    Hazy,
    Windy,
    Showers,
    Rain,
    ThunderyShowers,
    MistOrFog,
    Unknown,
}

impl ForecastCondition {
    /// Categorise an NEA forecast phrase such as "Partly Cloudy (Night)"
    ///
    /// The most severe keyword wins: "Heavy Thundery Showers with Gusty
    /// Winds" is thundery, not windy.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("thunder") {
            Self::ThunderyShowers
        } else if text.contains("shower") {
            Self::Showers
        } else if text.contains("rain") || text.contains("drizzle") {
            Self::Rain
        } else if text.contains("mist") || text.contains("fog") {
            Self::MistOrFog
        } else if text.contains("haz") {
            Self::Hazy
        } else if text.contains("wind") {
            Self::Windy
        } else if text.contains("cloud") || text.contains("overcast") {
            Self::Cloudy
        } else if text.contains("fair") || text.contains("sunny") || text.contains("warm") {
            Self::Fair
        } else {
            Self::Unknown
        }
    }

    /// Whether the condition involves precipitation
    #[must_use]
    pub const fn is_wet(self) -> bool {
        matches!(self, Self::Showers | Self::Rain | Self::ThunderyShowers)
    }

    /// Short label for display
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fair => "Fair",
            Self::Cloudy => "Cloudy",
            Self::Hazy => "Hazy",
            Self::Windy => "Windy",
            Self::Showers => "Showers",
            Self::Rain => "Rain",
            Self::ThunderyShowers => "Thundery showers",
            Self::MistOrFog => "Mist/fog",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ForecastCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One forecast issue covering all areas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastItem {
    pub updated_timestamp: DateTime<FixedOffset>,
    pub timestamp: DateTime<FixedOffset>,
    pub valid_period: ForecastPeriod,
    pub forecasts: Vec<Forecast>,
}

impl ForecastItem {
    /// Forecast for an area, matched case-insensitively
    #[must_use]
    pub fn forecast_for(&self, area: &str) -> Option<&Forecast> {
        self.forecasts
            .iter()
            .find(|f| f.area.eq_ignore_ascii_case(area.trim()))
    }
}

/// A forecast joined with its area's map location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaForecast {
    pub area: String,
    pub forecast: String,
    pub condition: ForecastCondition,
    pub location: Option<GeoLocation>,
}

/// Response of the two-hour forecast endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwoHourForecast {
    pub area_metadata: Vec<AreaMetadata>,
    pub items: Vec<ForecastItem>,
    pub pagination_token: Option<String>,
}

impl TwoHourForecast {
    /// Whether the payload carries no forecast at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.forecasts.is_empty())
    }

    /// Most recently issued forecast item
    #[must_use]
    pub fn latest_item(&self) -> Option<&ForecastItem> {
        self.items.iter().max_by_key(|item| item.timestamp)
    }

    /// Label location of an area, matched case-insensitively
    #[must_use]
    pub fn area_location(&self, name: &str) -> Option<GeoLocation> {
        let name = name.trim();
        self.area_metadata
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.label_location)
    }

    /// Areas whose name contains `query`, case-insensitively
    ///
    /// A blank query matches every area.
    #[must_use]
    pub fn filter_areas(&self, query: &str) -> Vec<&AreaMetadata> {
        let needle = query.trim().to_lowercase();
        self.area_metadata
            .iter()
            .filter(|a| needle.is_empty() || a.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Area whose label location is closest to `location`, with the distance in km
    #[must_use]
    pub fn nearest_area(&self, location: &GeoLocation) -> Option<(&AreaMetadata, f64)> {
        location.nearest(self.area_metadata.iter().map(|a| (a, a.label_location)))
    }

    /// Latest forecasts joined with area locations, optionally filtered by area name
    #[must_use]
    pub fn area_forecasts(&self, area_query: Option<&str>) -> Vec<AreaForecast> {
        let Some(item) = self.latest_item() else {
            return Vec::new();
        };
        let needle = area_query.map(|q| q.trim().to_lowercase()).unwrap_or_default();

        item.forecasts
            .iter()
            .filter(|f| needle.is_empty() || f.area.to_lowercase().contains(&needle))
            .map(|f| AreaForecast {
                area: f.area.clone(),
                forecast: f.forecast.clone(),
                condition: f.condition(),
                location: self.area_location(&f.area),
            })
            .collect()
    }
}
