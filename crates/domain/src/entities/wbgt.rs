//! Wet-bulb globe temperature (heat stress) entities

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::value_objects::GeoLocation;

/// Heat stress category published alongside each WBGT value
///
/// Ordered by severity, with `Unknown` lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatStress {
    Unknown,
    Low,
    Moderate,
    High,
}

impl HeatStress {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "moderate" => Self::Moderate,
            "high" => Self::High,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for HeatStress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "Unknown",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        })
    }
}

/// WBGT measured at one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbgtReading {
    pub station_id: String,
    pub station_name: String,
    pub town_center: Option<String>,
    pub location: Option<GeoLocation>,
    /// Degrees Celsius; `None` when the station published an unparseable value
    pub wbgt: Option<f64>,
    pub heat_stress: HeatStress,
}

/// WBGT readings for one observation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbgtObservation {
    pub observed_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub readings: Vec<WbgtReading>,
}

/// Response of the WBGT endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WbgtReport {
    pub observations: Vec<WbgtObservation>,
    pub pagination_token: Option<String>,
}

impl WbgtReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.iter().all(|o| o.readings.is_empty())
    }

    #[must_use]
    pub fn latest(&self) -> Option<&WbgtObservation> {
        self.observations.iter().max_by_key(|o| o.observed_at)
    }

    /// Highest WBGT value in the latest observation
    #[must_use]
    pub fn max_wbgt(&self) -> Option<f64> {
        self.latest()?
            .readings
            .iter()
            .filter_map(|r| r.wbgt)
            .max_by(f64::total_cmp)
    }

    /// Most severe heat stress in the latest observation
    #[must_use]
    pub fn highest_heat_stress(&self) -> Option<HeatStress> {
        self.latest()?.readings.iter().map(|r| r.heat_stress).max()
    }
}
