//! Lightning observation entities

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::value_objects::GeoLocation;

/// A detected lightning strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningStrike {
    pub location: GeoLocation,
    pub observed_at: Option<DateTime<FixedOffset>>,
    /// Description as published, e.g. "Cloud to Ground"
    pub text: Option<String>,
    /// Strike type code, e.g. "C" or "G"
    pub kind: Option<String>,
}

/// Strikes reported for one observation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningObservation {
    pub observed_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub strikes: Vec<LightningStrike>,
}

/// Response of the lightning endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightningReport {
    pub observations: Vec<LightningObservation>,
    pub pagination_token: Option<String>,
}

impl LightningReport {
    /// Whether no observation was published
    ///
    /// An observation with zero strikes is still data: it means no lightning.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&LightningObservation> {
        self.observations.iter().max_by_key(|o| o.observed_at)
    }

    #[must_use]
    pub fn strike_count(&self) -> usize {
        self.observations.iter().map(|o| o.strikes.len()).sum()
    }
}
