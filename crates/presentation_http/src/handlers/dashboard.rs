//! Dashboard hub handler

use application::{DashboardRequest, DashboardSnapshot};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use domain::ReadingQuery;
use serde::Deserialize;
use tracing::{info, instrument};

use super::weather::params;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    /// Restrict the forecast panel to matching areas
    pub area: Option<String>,
    /// Historical date; latest data when absent
    pub date: Option<String>,
}

impl DashboardParams {
    fn into_request(self) -> Result<DashboardRequest, ApiError> {
        let ReadingQuery { date, .. } = ReadingQuery::from_raw(self.date.as_deref(), None)?;
        let area = self
            .area
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        Ok(DashboardRequest { area, date })
    }
}

/// Everything a dashboard renders, each section tagged independently
///
/// Always 200 once parameters validate; failing sources are reported inside
/// the snapshot.
#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    query: Result<Query<DashboardParams>, QueryRejection>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let request = params(query)?.into_request()?;

    let snapshot = state.dashboard_service.snapshot(&request).await;
    info!(
        failed_sections = snapshot.failed_sections(),
        "Dashboard snapshot assembled"
    );
    Ok(Json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_params_mean_latest_everywhere() {
        let request = DashboardParams {
            area: Some("  ".to_string()),
            date: Some(String::new()),
        }
        .into_request()
        .unwrap();
        assert_eq!(request, DashboardRequest::default());
    }

    #[test]
    fn area_is_trimmed() {
        let request = DashboardParams {
            area: Some(" Bedok ".to_string()),
            date: None,
        }
        .into_request()
        .unwrap();
        assert_eq!(request.area.as_deref(), Some("Bedok"));
    }

    #[test]
    fn date_with_time_is_accepted() {
        let request = DashboardParams {
            area: None,
            date: Some(" 2024-07-15T14:30:00 ".to_string()),
        }
        .into_request()
        .unwrap();
        assert_eq!(request.date.unwrap().to_string(), "2024-07-15T14:30:00");
    }

    #[test]
    fn invalid_date_is_rejected() {
        let result = DashboardParams {
            area: None,
            date: Some("tomorrow".to_string()),
        }
        .into_request();
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
