//! Flight REST endpoints.
//!
//! The search body carries the query (origin, destination, dates,
//! passengers, class); sorting, filtering, and pagination arrive as
//! query-string parameters.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use atlas_tools::flight::{FlightError, FlightQuery, SearchOptions, SortBy};

use crate::AppState;

/// Upper bound on `limit` for the REST surface.
const MAX_PAGE_SIZE: usize = 100;

/// Query-string parameters of `POST /api/flights/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Sort criterion: `price`, `duration`, or `departure`.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Maximum price, inclusive.
    #[serde(default)]
    pub max_price: Option<f64>,
    /// Maximum duration in minutes, inclusive.
    #[serde(default)]
    pub max_duration: Option<u32>,
    /// Maximum stops (0-2), inclusive.
    #[serde(default)]
    pub max_stops: Option<u8>,
    /// Page size (1-100, default 20).
    #[serde(default)]
    pub limit: Option<usize>,
    /// Results to skip.
    #[serde(default)]
    pub offset: Option<usize>,
}

fn unprocessable(message: impl Into<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"error": message.into()})),
    )
        .into_response()
}

fn map_flight_error(err: &FlightError) -> Response {
    match err {
        FlightError::NotFound(_) => {
            (StatusCode::NOT_FOUND, Json(json!({"error": err.to_string()}))).into_response()
        }
        FlightError::InvalidQuery(_) => unprocessable(err.to_string()),
        FlightError::Backend { .. } => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

impl SearchParams {
    fn into_options(self) -> Result<SearchOptions, String> {
        let sort_by = match self.sort_by.as_deref() {
            None => SortBy::Price,
            Some(s) => SortBy::parse(s).ok_or_else(|| {
                format!("invalid sort_by '{s}': must be price, duration, or departure")
            })?,
        };
        if let Some(stops) = self.max_stops
            && stops > 2
        {
            return Err("max_stops must be between 0 and 2".into());
        }
        let limit = self.limit.unwrap_or(20);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(format!("limit must be between 1 and {MAX_PAGE_SIZE}"));
        }
        Ok(SearchOptions {
            sort_by,
            max_price: self.max_price,
            max_duration: self.max_duration,
            max_stops: self.max_stops,
            limit,
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// `POST /api/flights/search` — filtered, sorted, paginated search.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    Json(query): Json<FlightQuery>,
) -> Response {
    let options = match params.into_options() {
        Ok(options) => options,
        Err(message) => return unprocessable(message),
    };
    let query = match query.normalized() {
        Ok(query) => query,
        Err(err) => return unprocessable(err.to_string()),
    };
    match state.flights.search_flights(&query, &options).await {
        Ok(flights) => Json(flights).into_response(),
        Err(err) => map_flight_error(&err),
    }
}

/// `GET /api/flights/{flight_id}` — one flight by id, 404 when unknown.
pub async fn details(State(state): State<AppState>, Path(flight_id): Path<String>) -> Response {
    match state.flights.get_flight_details(&flight_id).await {
        Ok(flight) => Json(flight).into_response(),
        Err(err) => map_flight_error(&err),
    }
}

/// `GET /api/flights/{flight_id}/availability` — booking availability.
pub async fn availability(
    State(state): State<AppState>,
    Path(flight_id): Path<String>,
) -> Response {
    match state.flights.check_availability(&flight_id).await {
        Ok(available) => Json(json!({"available": available})).into_response(),
        Err(err) => map_flight_error(&err),
    }
}
