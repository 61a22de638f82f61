//! Caching decorator for `WeatherDataPort`
//!
//! Successful upstream responses are cached under
//! `nea:{endpoint}:{date}:{pagination token}`. Queries for an explicit date
//! describe the past and live much longer than latest readings.

use std::sync::Arc;
use std::time::Duration;

use application::error::ApplicationError;
use application::ports::{CachePort, CachePortExt, WeatherDataPort, ttl};
use async_trait::async_trait;
use domain::{
    LightningReport, ReadingQuery, StationMetric, StationReadings, TwoHourForecast, WbgtReport,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// TTLs applied per kind of query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Latest station readings, lightning and WBGT
    pub realtime: Duration,
    /// Latest two-hour forecast
    pub forecast: Duration,
    /// Any query with an explicit date
    pub historical: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            realtime: ttl::REALTIME,
            forecast: ttl::FORECAST,
            historical: ttl::HISTORICAL,
        }
    }
}

impl CacheTtls {
    fn for_query(&self, query: &ReadingQuery, latest_ttl: Duration) -> Duration {
        if query.date.is_some() {
            self.historical
        } else {
            latest_ttl
        }
    }
}

/// Weather data port that consults a cache before the wrapped port
pub struct CachedWeatherAdapter {
    inner: Arc<dyn WeatherDataPort>,
    cache: Arc<dyn CachePort>,
    ttls: CacheTtls,
}

impl std::fmt::Debug for CachedWeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedWeatherAdapter")
            .field("inner", &"<WeatherDataPort>")
            .field("cache", &self.cache)
            .field("ttls", &self.ttls)
            .finish()
    }
}

impl CachedWeatherAdapter {
    #[must_use]
    pub fn new(inner: Arc<dyn WeatherDataPort>, cache: Arc<dyn CachePort>) -> Self {
        Self {
            inner,
            cache,
            ttls: CacheTtls::default(),
        }
    }

    #[must_use]
    pub const fn with_ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    fn cache_key(endpoint: &str, query: &ReadingQuery) -> String {
        format!("nea:{endpoint}:{}", query.cache_key())
    }

    /// Return the cached value or run `fetch` and cache its success
    ///
    /// Cache failures are logged and never fail the request.
    async fn cached<T, F>(&self, key: String, ttl: Duration, fetch: F) -> Result<T, ApplicationError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: Future<Output = Result<T, ApplicationError>> + Send,
    {
        match self.cache.get::<T>(&key).await {
            Ok(Some(value)) => {
                debug!(key = %key, "Serving cached NEA response");
                return Ok(value);
            },
            Ok(None) => {},
            Err(e) => warn!(key = %key, error = %e, "Cache read failed"),
        }

        let value = fetch.await?;

        if let Err(e) = self.cache.set(&key, &value, ttl).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
        Ok(value)
    }
}

#[async_trait]
impl WeatherDataPort for CachedWeatherAdapter {
    #[instrument(skip(self))]
    async fn two_hour_forecast(
        &self,
        query: &ReadingQuery,
    ) -> Result<TwoHourForecast, ApplicationError> {
        let key = Self::cache_key("two-hr-forecast", query);
        let ttl = self.ttls.for_query(query, self.ttls.forecast);
        self.cached(key, ttl, self.inner.two_hour_forecast(query))
            .await
    }

    #[instrument(skip(self), fields(metric = %metric))]
    async fn station_readings(
        &self,
        metric: StationMetric,
        query: &ReadingQuery,
    ) -> Result<StationReadings, ApplicationError> {
        let key = Self::cache_key(metric.slug(), query);
        let ttl = self.ttls.for_query(query, self.ttls.realtime);
        self.cached(key, ttl, self.inner.station_readings(metric, query))
            .await
    }

    #[instrument(skip(self))]
    async fn lightning(&self, query: &ReadingQuery) -> Result<LightningReport, ApplicationError> {
        let key = Self::cache_key("lightning", query);
        let ttl = self.ttls.for_query(query, self.ttls.realtime);
        self.cached(key, ttl, self.inner.lightning(query)).await
    }

    #[instrument(skip(self))]
    async fn wbgt(&self, query: &ReadingQuery) -> Result<WbgtReport, ApplicationError> {
        let key = Self::cache_key("wbgt", query);
        let ttl = self.ttls.for_query(query, self.ttls.realtime);
        self.cached(key, ttl, self.inner.wbgt(query)).await
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::DateTime;
    use domain::{ReadingDate, StationReading, StationValue};

    use super::*;
    use crate::cache::MokaCache;

    /// Counts upstream calls; fails when `fail` is set
    #[derive(Default)]
    struct CountingPort {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingPort {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) -> Result<(), ApplicationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ApplicationError::ExternalService("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl WeatherDataPort for CountingPort {
        async fn two_hour_forecast(
            &self,
            _query: &ReadingQuery,
        ) -> Result<TwoHourForecast, ApplicationError> {
            self.hit()?;
            Ok(TwoHourForecast::default())
        }

        async fn station_readings(
            &self,
            _metric: StationMetric,
            _query: &ReadingQuery,
        ) -> Result<StationReadings, ApplicationError> {
            self.hit()?;
            Ok(StationReadings {
                stations: Vec::new(),
                readings: vec![StationReading {
                    timestamp: DateTime::parse_from_rfc3339("2024-07-15T14:05:00+08:00").unwrap(),
                    data: vec![StationValue {
                        station_id: "S109".into(),
                        value: 29.4,
                    }],
                }],
                reading_type: Some("DBT 1M F".into()),
                reading_unit: Some("deg C".into()),
                pagination_token: None,
            })
        }

        async fn lightning(
            &self,
            _query: &ReadingQuery,
        ) -> Result<LightningReport, ApplicationError> {
            self.hit()?;
            Ok(LightningReport::default())
        }

        async fn wbgt(&self, _query: &ReadingQuery) -> Result<WbgtReport, ApplicationError> {
            self.hit()?;
            Ok(WbgtReport::default())
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn adapter(port: Arc<CountingPort>) -> CachedWeatherAdapter {
        CachedWeatherAdapter::new(port, Arc::new(MokaCache::new()))
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let port = Arc::new(CountingPort::default());
        let adapter = adapter(Arc::clone(&port));
        let query = ReadingQuery::latest();

        let first = adapter
            .station_readings(StationMetric::AirTemperature, &query)
            .await
            .unwrap();
        let second = adapter
            .station_readings(StationMetric::AirTemperature, &query)
            .await
            .unwrap();

        assert_eq!(port.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn keys_separate_metrics_and_dates() {
        let port = Arc::new(CountingPort::default());
        let adapter = adapter(Arc::clone(&port));
        let latest = ReadingQuery::latest();
        let dated = ReadingQuery::on(ReadingDate::parse("2024-07-15").unwrap());

        adapter
            .station_readings(StationMetric::AirTemperature, &latest)
            .await
            .unwrap();
        adapter
            .station_readings(StationMetric::Rainfall, &latest)
            .await
            .unwrap();
        adapter
            .station_readings(StationMetric::AirTemperature, &dated)
            .await
            .unwrap();

        assert_eq!(port.calls(), 3);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let port = Arc::new(CountingPort {
            fail: true,
            ..CountingPort::default()
        });
        let adapter = adapter(Arc::clone(&port));

        assert!(adapter.wbgt(&ReadingQuery::latest()).await.is_err());
        assert!(adapter.wbgt(&ReadingQuery::latest()).await.is_err());
        assert_eq!(port.calls(), 2);
    }

    #[tokio::test]
    async fn expired_entries_refetch() {
        let port = Arc::new(CountingPort::default());
        let adapter = adapter(Arc::clone(&port)).with_ttls(CacheTtls {
            realtime: Duration::from_millis(50),
            ..CacheTtls::default()
        });

        adapter.lightning(&ReadingQuery::latest()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        adapter.lightning(&ReadingQuery::latest()).await.unwrap();

        assert_eq!(port.calls(), 2);
    }

    #[test]
    fn ttl_selection() {
        let ttls = CacheTtls::default();
        let dated = ReadingQuery::on(ReadingDate::parse("2024-07-15").unwrap());

        assert_eq!(ttls.for_query(&dated, ttls.realtime), ttl::HISTORICAL);
        assert_eq!(
            ttls.for_query(&ReadingQuery::latest(), ttls.forecast),
            ttl::FORECAST
        );
    }

    #[test]
    fn cache_key_format() {
        let query = ReadingQuery::on(ReadingDate::parse("2024-07-15").unwrap())
            .with_pagination_token("abc");
        assert_eq!(
            CachedWeatherAdapter::cache_key("wbgt", &query),
            "nea:wbgt:2024-07-15:abc"
        );
    }
}
