//! Client for the SgWeather HTTP API

use presentation_http::ErrorResponse;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not reach {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// The server answered with its JSON error body
    #[error("{error} (HTTP {status})")]
    Api { status: u16, error: String },

    #[error("Unexpected response (HTTP {status}): {body}")]
    Unexpected { status: u16, body: String },
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and decode the JSON body, skipping empty parameters
    pub async fn get_json<T>(&self, path: &str, params: &[(&str, Option<String>)]) -> Result<T, CliError>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.get_raw(path, params).await?;
        if !status.is_success() {
            return Err(Self::error_from(status, body));
        }
        serde_json::from_str(&body).map_err(|e| CliError::Unexpected {
            status: status.as_u16(),
            body: e.to_string(),
        })
    }

    /// GET `path`, returning status and body without interpreting either
    pub async fn get_raw(
        &self,
        path: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<(StatusCode, String), CliError> {
        let url = self.endpoint_url(path);
        let query: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
            .collect();
        debug!(url = %url, ?query, "GET");

        let unreachable = |e: reqwest::Error| CliError::Unreachable {
            url: url.clone(),
            reason: e.to_string(),
        };
        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(unreachable)?;
        let status = response.status();
        let body = response.text().await.map_err(unreachable)?;
        Ok((status, body))
    }

    fn error_from(status: StatusCode, body: String) -> CliError {
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => CliError::Api {
                status: status.as_u16(),
                error: match err.details {
                    Some(details) => format!("{}: {details}", err.error),
                    None => err.error,
                },
            },
            Err(_) => CliError::Unexpected {
                status: status.as_u16(),
                body,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn endpoint_url_trims_trailing_slash() {
        let client = ApiClient::new("http://example.com/");
        assert_eq!(
            client.endpoint_url("/v1/weather/dashboard"),
            "http://example.com/v1/weather/dashboard"
        );
    }

    #[tokio::test]
    async fn skips_absent_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/weather/forecast"))
            .and(query_param("area", "Bedok"))
            .and(query_param_is_missing("date"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "area": "Bedok",
                "forecasts": []
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri());
        let body: serde_json::Value = client
            .get_json(
                "/v1/weather/forecast",
                &[("area", Some("Bedok".to_string())), ("date", None)],
            )
            .await
            .unwrap();
        assert_eq!(body["area"], "Bedok");
    }

    #[tokio::test]
    async fn decodes_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "Area not found: Atlantis",
                "code": "not_found"
            })))
            .mount(&server)
            .await;

        let err = ApiClient::new(&server.uri())
            .get_json::<serde_json::Value>("/v1/weather/forecast", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Area not found: Atlantis (HTTP 404)");
    }

    #[tokio::test]
    async fn non_json_error_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = ApiClient::new(&server.uri())
            .get_json::<serde_json::Value>("/health", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Unexpected { status: 502, .. }));
    }

    #[tokio::test]
    async fn unreachable_server() {
        let err = ApiClient::new("http://127.0.0.1:1")
            .get_json::<serde_json::Value>("/health", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Unreachable { .. }));
    }
}
