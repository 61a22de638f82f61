//! Weather entities mirrored from the NEA real-time API
//!
//! Timestamps keep the SGT offset the API reports.

mod forecast;
mod lightning;
mod station;
mod wbgt;

pub use forecast::{
    AreaForecast, AreaMetadata, Forecast, ForecastCondition, ForecastItem, ForecastPeriod,
    TwoHourForecast,
};
pub use lightning::{LightningObservation, LightningReport, LightningStrike};
pub use station::{
    Station, StationMetric, StationObservation, StationReading, StationReadings, StationValue,
};
pub use wbgt::{HeatStress, WbgtObservation, WbgtReading, WbgtReport};
