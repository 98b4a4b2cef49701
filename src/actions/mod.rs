pub mod health;
pub mod stats;

pub use health::*;
pub use stats::*;

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::etag::{fingerprint, is_unchanged};
use crate::time_range::{HourWindow, TimeRange};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// What an entity tag covers: the data plus the parameters that produced it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedPayload<'a, T> {
    pub data: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<HourWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl<'a, T> TaggedPayload<'a, T> {
    pub fn new(data: &'a T) -> Self {
        Self {
            data,
            time_range: None,
            hours: None,
            limit: None,
        }
    }

    pub fn time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    pub fn hours(mut self, hours: HourWindow) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// JSON response with an `ETag`, or `304 Not Modified` when the client's
/// `If-None-Match` already names the current tag
pub fn etag_json<T: Serialize>(headers: &HeaderMap, payload: TaggedPayload<'_, T>) -> Response {
    let etag = match fingerprint(&payload) {
        Ok(etag) => etag,
        Err(e) => {
            error!("Failed to compute ETag: {:#}", e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode response");
        }
    };
    let etag_header = match HeaderValue::from_str(&etag) {
        Ok(value) => value,
        Err(e) => {
            error!("Invalid ETag header value {}: {}", etag, e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode response");
        }
    };
    let cache_control = HeaderValue::from_static("no-cache");

    let client_tag = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());

    if is_unchanged(client_tag, &etag) {
        metrics::counter!("stats.api.not_modified_total").increment(1);
        return (
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag_header), (header::CACHE_CONTROL, cache_control)],
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(header::ETAG, etag_header), (header::CACHE_CONTROL, cache_control)],
        Json(payload.data),
    )
        .into_response()
}
