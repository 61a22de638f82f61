//! Query parameters shared by every NEA real-time endpoint

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// SGT date or instant for which historical data is requested
///
/// NEA accepts either `YYYY-MM-DD` (whole day) or `YYYY-MM-DDTHH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReadingDate {
    /// All readings of a calendar day
    Day(NaiveDate),
    /// Readings around a specific local time
    Instant(NaiveDateTime),
}

impl ReadingDate {
    /// Parse the textual form accepted by the upstream API
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if let Ok(instant) = NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT) {
            return Ok(Self::Instant(instant));
        }
        if let Ok(day) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Ok(Self::Day(day));
        }
        Err(DomainError::InvalidDateTime(format!(
            "{input} (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)"
        )))
    }
}

impl fmt::Display for ReadingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(day) => write!(f, "{}", day.format(DATE_FORMAT)),
            Self::Instant(instant) => write!(f, "{}", instant.format(DATE_TIME_FORMAT)),
        }
    }
}

impl TryFrom<String> for ReadingDate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReadingDate> for String {
    fn from(value: ReadingDate) -> Self {
        value.to_string()
    }
}

/// Optional date and pagination cursor for a real-time request
///
/// The default query asks for the latest available data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadingQuery {
    /// Historical date; `None` requests the latest readings
    pub date: Option<ReadingDate>,
    /// Cursor returned by a previous page
    pub pagination_token: Option<String>,
}

impl ReadingQuery {
    /// Query for the latest data
    #[must_use]
    pub fn latest() -> Self {
        Self::default()
    }

    /// Query for a specific date
    #[must_use]
    pub fn on(date: ReadingDate) -> Self {
        Self {
            date: Some(date),
            pagination_token: None,
        }
    }

    /// Build a query from raw, optional request parameters
    ///
    /// Blank strings are treated as absent.
    pub fn from_raw(date: Option<&str>, pagination_token: Option<&str>) -> Result<Self, DomainError> {
        let date = date
            .filter(|d| !d.trim().is_empty())
            .map(ReadingDate::parse)
            .transpose()?;
        let pagination_token = pagination_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        Ok(Self {
            date,
            pagination_token,
        })
    }

    /// Continue from a pagination cursor
    #[must_use]
    pub fn with_pagination_token(mut self, token: impl Into<String>) -> Self {
        self.pagination_token = Some(token.into());
        self
    }

    /// Stable textual key for caching responses to this query
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}",
            self.date.map_or_else(|| "latest".to_string(), |d| d.to_string()),
            self.pagination_token.as_deref().unwrap_or("-")
        )
    }
}
