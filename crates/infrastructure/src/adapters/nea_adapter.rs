//! NEA adapter - Implements `WeatherDataPort` using `integration_nea`

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::WeatherDataPort;
use async_trait::async_trait;
use domain::{
    LightningReport, ReadingQuery, StationMetric, StationReadings, TwoHourForecast, WbgtReport,
};
use integration_nea::{NeaClient, NeaConfig, NeaError, NeaHttpClient};
use tracing::{debug, instrument, warn};

/// Adapter for the NEA real-time API
pub struct NeaWeatherAdapter {
    client: Arc<dyn NeaClient>,
}

impl std::fmt::Debug for NeaWeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeaWeatherAdapter")
            .field("client", &"<NeaClient>")
            .finish()
    }
}

impl NeaWeatherAdapter {
    /// Create an adapter backed by the reqwest client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: NeaConfig) -> Result<Self, ApplicationError> {
        let client = NeaHttpClient::new(config).map_err(Self::map_error)?;
        Ok(Self::from_client(Arc::new(client)))
    }

    /// Wrap an existing client
    #[must_use]
    pub fn from_client(client: Arc<dyn NeaClient>) -> Self {
        Self { client }
    }

    /// Map integration errors to application errors
    fn map_error(err: NeaError) -> ApplicationError {
        match err {
            NeaError::RequestFailed(e) => ApplicationError::ExternalService(e),
            NeaError::Api { status, .. } | NeaError::Http { status, .. } => {
                ApplicationError::Upstream {
                    status,
                    message: err.to_string(),
                }
            },
            NeaError::NoData(e) => ApplicationError::NoData(e),
            NeaError::RateLimited => ApplicationError::RateLimited,
            NeaError::Parse(e) => ApplicationError::Parse(e),
            NeaError::Configuration(e) => ApplicationError::Configuration(e),
        }
    }

    fn log_failure(endpoint: &str, err: &NeaError) {
        match err {
            NeaError::NoData(_) => debug!(endpoint, "NEA returned no data"),
            _ => warn!(endpoint, error = %err, "NEA request failed"),
        }
    }
}

#[async_trait]
impl WeatherDataPort for NeaWeatherAdapter {
    #[instrument(skip(self))]
    async fn two_hour_forecast(
        &self,
        query: &ReadingQuery,
    ) -> Result<TwoHourForecast, ApplicationError> {
        self.client.two_hour_forecast(query).await.map_err(|e| {
            Self::log_failure("two-hr-forecast", &e);
            Self::map_error(e)
        })
    }

    #[instrument(skip(self), fields(metric = %metric))]
    async fn station_readings(
        &self,
        metric: StationMetric,
        query: &ReadingQuery,
    ) -> Result<StationReadings, ApplicationError> {
        self.client
            .station_readings(metric, query)
            .await
            .map_err(|e| {
                Self::log_failure(metric.slug(), &e);
                Self::map_error(e)
            })
    }

    #[instrument(skip(self))]
    async fn lightning(&self, query: &ReadingQuery) -> Result<LightningReport, ApplicationError> {
        self.client.lightning(query).await.map_err(|e| {
            Self::log_failure("lightning", &e);
            Self::map_error(e)
        })
    }

    #[instrument(skip(self))]
    async fn wbgt(&self, query: &ReadingQuery) -> Result<WbgtReport, ApplicationError> {
        self.client.wbgt(query).await.map_err(|e| {
            Self::log_failure("wbgt", &e);
            Self::map_error(e)
        })
    }

    async fn is_available(&self) -> bool {
        self.client.is_healthy().await
    }
}
