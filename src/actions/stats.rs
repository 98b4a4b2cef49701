use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::actions::{TaggedPayload, etag_json, json_error};
use crate::stats_service::AggregationError;
use crate::time_range::{HourWindow, TimeRange};
use crate::web::AppState;

pub const DEFAULT_LIMIT: usize = 50;

// ============================================================================
// Query Parameters
// ============================================================================

/// Raw strings so a malformed value falls back to the default instead of
/// rejecting the request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowParams {
    pub time_range: Option<String>,
    pub limit: Option<String>,
}

impl WindowParams {
    pub fn time_range(&self) -> TimeRange {
        TimeRange::from_param(self.time_range.as_deref())
    }

    pub fn limit(&self) -> usize {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                debug!("Invalid limit '{}', using {}", raw, DEFAULT_LIMIT);
                DEFAULT_LIMIT
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HoursParams {
    pub hours: Option<String>,
}

impl HoursParams {
    pub fn window(&self) -> HourWindow {
        HourWindow::from_param(self.hours.as_deref())
    }
}

fn failure(what: &str, e: AggregationError) -> Response {
    metrics::counter!("stats.api.errors_total").increment(1);
    error!("Failed to fetch {}: {}", what, e);
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("Failed to fetch {}", what),
    )
}

// ============================================================================
// Handler Functions
// ============================================================================

/// GET /api/stats
pub async fn get_stats(
    Query(params): Query<WindowParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    metrics::counter!("stats.api.stats.requests_total").increment(1);
    let time_range = params.time_range();

    match state.stats.dashboard_stats(time_range).await {
        Ok(data) => etag_json(&headers, TaggedPayload::new(&data).time_range(time_range)),
        Err(e) => failure("statistics", e),
    }
}

/// GET /api/aircraft-types
pub async fn get_aircraft_types(
    Query(params): Query<WindowParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    metrics::counter!("stats.api.aircraft_types.requests_total").increment(1);
    let (time_range, limit) = (params.time_range(), params.limit());

    match state.stats.top_aircraft_types(time_range, limit).await {
        Ok(data) => etag_json(
            &headers,
            TaggedPayload::new(&data).time_range(time_range).limit(limit),
        ),
        Err(e) => failure("aircraft types", e),
    }
}

/// GET /api/countries
pub async fn get_countries(
    Query(params): Query<WindowParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    metrics::counter!("stats.api.countries.requests_total").increment(1);
    let (time_range, limit) = (params.time_range(), params.limit());

    match state.stats.top_countries(time_range, limit).await {
        Ok(data) => etag_json(
            &headers,
            TaggedPayload::new(&data).time_range(time_range).limit(limit),
        ),
        Err(e) => failure("countries", e),
    }
}

/// GET /api/airlines
pub async fn get_airlines(
    Query(params): Query<WindowParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    metrics::counter!("stats.api.airlines.requests_total").increment(1);
    let (time_range, limit) = (params.time_range(), params.limit());

    match state.stats.top_airlines(time_range, limit).await {
        Ok(data) => etag_json(
            &headers,
            TaggedPayload::new(&data).time_range(time_range).limit(limit),
        ),
        Err(e) => failure("airlines", e),
    }
}

/// GET /api/hourly-stats
pub async fn get_hourly_stats(
    Query(params): Query<HoursParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    metrics::counter!("stats.api.hourly_stats.requests_total").increment(1);
    let window = params.window();

    match state.stats.hourly_stats(window).await {
        Ok(data) => etag_json(&headers, TaggedPayload::new(&data).hours(window)),
        Err(e) => failure("hourly statistics", e),
    }
}

/// GET /api/hourly-country-stats
pub async fn get_hourly_country_stats(
    Query(params): Query<HoursParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    metrics::counter!("stats.api.hourly_country_stats.requests_total").increment(1);
    let window = params.window();

    match state.stats.hourly_country_stats(window).await {
        Ok(data) => etag_json(&headers, TaggedPayload::new(&data).hours(window)),
        Err(e) => failure("hourly country statistics", e),
    }
}

/// GET /api/hourly-airline-stats
pub async fn get_hourly_airline_stats(
    Query(params): Query<HoursParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    metrics::counter!("stats.api.hourly_airline_stats.requests_total").increment(1);
    let window = params.window();

    match state.stats.hourly_airline_stats(window).await {
        Ok(data) => etag_json(&headers, TaggedPayload::new(&data).hours(window)),
        Err(e) => failure("hourly airline statistics", e),
    }
}

/// GET /api/current-aircraft
///
/// Live data, so no entity tag.
pub async fn get_current_aircraft(State(state): State<AppState>) -> impl IntoResponse {
    metrics::counter!("stats.api.current_aircraft.requests_total").increment(1);

    match state.stats.current_aircraft().await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => failure("current aircraft", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(time_range: Option<&str>, limit: Option<&str>) -> WindowParams {
        WindowParams {
            time_range: time_range.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_window_params_defaults() {
        let p = params(None, None);
        assert_eq!(p.time_range(), TimeRange::Week);
        assert_eq!(p.limit(), 50);

        let p = params(Some("2h"), Some("10"));
        assert_eq!(p.time_range(), TimeRange::TwoHours);
        assert_eq!(p.limit(), 10);

        let p = params(Some("forever"), Some("-3"));
        assert_eq!(p.time_range(), TimeRange::Week);
        assert_eq!(p.limit(), 50);
    }
}
