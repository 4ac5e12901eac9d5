//! Business logic over the flight backend: filtering, sorting,
//! pagination.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::flight::client::FlightClient;
use crate::flight::models::{Flight, FlightError, FlightQuery, SortBy};

/// Default page size for search results.
pub const DEFAULT_LIMIT: usize = 20;

/// Post-search shaping: filters, sort order, page window.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    /// Sort criterion.
    pub sort_by: SortBy,
    /// Keep flights at or below this price.
    pub max_price: Option<f64>,
    /// Keep flights at or below this duration, in minutes.
    pub max_duration: Option<u32>,
    /// Keep flights with at most this many stops.
    pub max_stops: Option<u8>,
    /// Page size.
    pub limit: usize,
    /// Results to skip before the page.
    pub offset: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sort_by: SortBy::Price,
            max_price: None,
            max_duration: None,
            max_stops: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Flight search with business rules applied on top of a backend.
pub struct FlightService {
    client: Arc<dyn FlightClient>,
}

impl FlightService {
    /// Wrap a backend client.
    #[must_use]
    pub fn new(client: Arc<dyn FlightClient>) -> Self {
        Self { client }
    }

    /// Search, then filter, sort, and paginate the results.
    #[instrument(skip_all, fields(origin = %query.origin, destination = %query.destination))]
    pub async fn search_flights(
        &self,
        query: &FlightQuery,
        options: &SearchOptions,
    ) -> Result<Vec<Flight>, FlightError> {
        let flights = self.client.search(query).await?;
        let total = flights.len();

        let mut flights: Vec<Flight> = flights
            .into_iter()
            .filter(|f| options.max_price.is_none_or(|max| f.price <= max))
            .filter(|f| options.max_duration.is_none_or(|max| f.duration_minutes <= max))
            .filter(|f| options.max_stops.is_none_or(|max| f.stops <= max))
            .collect();

        match options.sort_by {
            SortBy::Price => flights.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortBy::Duration => flights.sort_by_key(|f| f.duration_minutes),
            SortBy::Departure => flights.sort_by_key(|f| f.departure),
        }

        let page: Vec<Flight> = flights
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .collect();
        debug!(total, returned = page.len(), "flight search complete");
        Ok(page)
    }

    /// Look up one flight by id.
    pub async fn get_flight_details(&self, flight_id: &str) -> Result<Flight, FlightError> {
        self.client.get_flight_details(flight_id).await
    }

    /// Whether the flight can still be booked.
    pub async fn check_availability(&self, flight_id: &str) -> Result<bool, FlightError> {
        self.client.check_availability(flight_id).await
    }
}
