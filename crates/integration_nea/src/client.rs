//! NEA real-time API client
//!
//! HTTP client for the data.gov.sg v2 real-time weather endpoints.

use async_trait::async_trait;
use domain::{
    LightningReport, ReadingQuery, StationMetric, StationReadings, TwoHourForecast, WbgtReport,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::{
    Envelope, ErrorBody, LightningData, StationReadingsData, TwoHourForecastData, WbgtData,
};

/// NEA client errors
#[derive(Debug, Error)]
pub enum NeaError {
    /// The HTTP client could not be built
    #[error("Client configuration error: {0}")]
    Configuration(String),

    /// Transport failure (connect, timeout, TLS)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Upstream rejected the request with a structured error body
    #[error("{name}: {message}")]
    Api {
        status: u16,
        name: String,
        message: String,
    },

    /// Upstream returned a non-success status without a usable body
    #[error("Error from weather API: {body}")]
    Http { status: u16, body: String },

    /// Upstream has nothing for this query
    #[error("No data available: {0}")]
    NoData(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

/// NEA client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeaConfig {
    /// API base URL (default: <https://api-open.data.gov.sg/v2/real-time/api>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://api-open.data.gov.sg/v2/real-time/api".to_string()
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("sgweather/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for NeaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Client for the NEA real-time endpoints
#[async_trait]
pub trait NeaClient: Send + Sync {
    /// Two-hour area forecast (updated half-hourly)
    async fn two_hour_forecast(&self, query: &ReadingQuery) -> Result<TwoHourForecast, NeaError>;

    /// Station readings for one metric (updated every minute or five)
    async fn station_readings(
        &self,
        metric: StationMetric,
        query: &ReadingQuery,
    ) -> Result<StationReadings, NeaError>;

    /// Lightning observations
    async fn lightning(&self, query: &ReadingQuery) -> Result<LightningReport, NeaError>;

    /// Wet-bulb globe temperature readings
    async fn wbgt(&self, query: &ReadingQuery) -> Result<WbgtReport, NeaError>;

    /// Check if the upstream API answers
    async fn is_healthy(&self) -> bool;
}

/// reqwest-backed NEA client
#[derive(Debug)]
pub struct NeaHttpClient {
    client: Client,
    config: NeaConfig,
}

impl NeaHttpClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: NeaConfig) -> Result<Self, NeaError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| NeaError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Query string pairs; `date` and `paginationToken` only when set
    fn query_params<'a>(
        fixed: &[(&'static str, &'a str)],
        query: &'a ReadingQuery,
        date: Option<&'a str>,
    ) -> Vec<(&'static str, &'a str)> {
        let mut params = fixed.to_vec();
        if let Some(date) = date {
            params.push(("date", date));
        }
        if let Some(token) = query.pagination_token.as_deref() {
            params.push(("paginationToken", token));
        }
        params
    }

    /// GET an endpoint and unwrap the `{ code, errorMsg, data }` envelope
    async fn fetch<T>(
        &self,
        path: &str,
        fixed: &[(&'static str, &str)],
        query: &ReadingQuery,
    ) -> Result<T, NeaError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let date = query.date.map(|d| d.to_string());
        let params = Self::query_params(fixed, query, date.as_deref());

        debug!(url = %url, ?params, "Fetching NEA data");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| NeaError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NeaError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| NeaError::Parse(e.to_string()))?;

        if envelope.code != 0 {
            warn!(code = envelope.code, "NEA returned an error envelope");
            return Err(NeaError::Api {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                name: format!("code {}", envelope.code),
                message: envelope
                    .error_msg
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        envelope
            .data
            .ok_or_else(|| NeaError::NoData(format!("{path} returned no data")))
    }

    fn status_error(status: StatusCode, body: &str) -> NeaError {
        let parsed = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .filter(ErrorBody::is_meaningful);

        match status {
            StatusCode::NOT_FOUND => NeaError::NoData(
                parsed
                    .and_then(|b| b.error_msg)
                    .unwrap_or_else(|| "not found".to_string()),
            ),
            StatusCode::TOO_MANY_REQUESTS => NeaError::RateLimited,
            _ => match parsed {
                Some(error) => NeaError::Api {
                    status: status.as_u16(),
                    name: error.name.unwrap_or_else(|| status.to_string()),
                    message: error.error_msg.unwrap_or_default(),
                },
                None => NeaError::Http {
                    status: status.as_u16(),
                    body: body.to_string(),
                },
            },
        }
    }
}

#[async_trait]
impl NeaClient for NeaHttpClient {
    #[instrument(skip(self))]
    async fn two_hour_forecast(&self, query: &ReadingQuery) -> Result<TwoHourForecast, NeaError> {
        let data: TwoHourForecastData = self.fetch("/two-hr-forecast", &[], query).await?;
        Ok(data.into())
    }

    #[instrument(skip(self), fields(metric = %metric))]
    async fn station_readings(
        &self,
        metric: StationMetric,
        query: &ReadingQuery,
    ) -> Result<StationReadings, NeaError> {
        let data: StationReadingsData = self.fetch(&metric.path(), &[], query).await?;
        Ok(data.into())
    }

    #[instrument(skip(self))]
    async fn lightning(&self, query: &ReadingQuery) -> Result<LightningReport, NeaError> {
        let data: LightningData = self.fetch("/weather", &[("api", "lightning")], query).await?;
        Ok(data.into())
    }

    #[instrument(skip(self))]
    async fn wbgt(&self, query: &ReadingQuery) -> Result<WbgtReport, NeaError> {
        let data: WbgtData = self.fetch("/weather", &[("api", "wbgt")], query).await?;
        Ok(data.into())
    }

    async fn is_healthy(&self) -> bool {
        // "No data" still proves the API is reachable
        matches!(
            self.two_hour_forecast(&ReadingQuery::latest()).await,
            Ok(_) | Err(NeaError::NoData(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ReadingDate;

    #[test]
    fn test_config_defaults() {
        let config = NeaConfig::default();
        assert_eq!(
            config.base_url,
            "https://api-open.data.gov.sg/v2/real-time/api"
        );
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("sgweather/"));
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: NeaConfig = serde_json::from_str(r#"{"timeout_secs": 5}"#).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, default_base_url());
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = NeaHttpClient::new(NeaConfig {
            base_url: "http://localhost:1234/api/".to_string(),
            ..NeaConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("/rainfall"), "http://localhost:1234/api/rainfall");
    }

    #[test]
    fn test_query_params_only_when_present() {
        let latest = ReadingQuery::latest();
        assert!(NeaHttpClient::query_params(&[], &latest, None).is_empty());

        let query = ReadingQuery::on(ReadingDate::parse("2024-07-15").unwrap())
            .with_pagination_token("next");
        let params = NeaHttpClient::query_params(&[("api", "wbgt")], &query, Some("2024-07-15"));
        assert_eq!(
            params,
            vec![
                ("api", "wbgt"),
                ("date", "2024-07-15"),
                ("paginationToken", "next")
            ]
        );
    }

    #[test]
    fn test_status_error_mapping() {
        let api = NeaHttpClient::status_error(
            StatusCode::BAD_REQUEST,
            r#"{"code": 4, "name": "ERROR_PARAMS", "data": null, "errorMsg": "Invalid date"}"#,
        );
        assert!(matches!(api, NeaError::Api { status: 400, .. }));
        assert_eq!(api.to_string(), "ERROR_PARAMS: Invalid date");

        let http = NeaHttpClient::status_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(http, NeaError::Http { status: 502, .. }));
        assert_eq!(http.to_string(), "Error from weather API: upstream down");

        assert!(matches!(
            NeaHttpClient::status_error(StatusCode::NOT_FOUND, ""),
            NeaError::NoData(_)
        ));
        assert!(matches!(
            NeaHttpClient::status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            NeaError::RateLimited
        ));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(NeaError::RateLimited.to_string(), "Rate limit exceeded");
        assert_eq!(
            NeaError::Parse("bad json".to_string()).to_string(),
            "Parse error: bad json"
        );
    }
}
