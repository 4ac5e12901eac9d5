//! The `search_flights` chat tool.
//!
//! User-correctable problems (bad airport code, malformed date) come
//! back as `Ok` text starting with "Error:" so the model can read them
//! and retry with fixed arguments. Only infrastructure failures map to
//! [`ToolError`].

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::{info, instrument};

use atlas_core::tools::ToolDefinition;

use crate::errors::ToolError;
use crate::flight::models::{Flight, FlightError, FlightQuery, SortBy};
use crate::flight::service::{FlightService, SearchOptions};
use crate::schema::ToolSchemaBuilder;
use crate::traits::ChatTool;
use crate::validation::{optional_f64, optional_i64, optional_string, require_string};

/// Registered name of the tool.
pub const TOOL_NAME: &str = "search_flights";

/// Default number of options shown to the model.
const DEFAULT_TOOL_LIMIT: i64 = 5;

const DESCRIPTION: &str = "Search for flights between two airports. \
Use when the user asks about flights, airfare, or travel options between \
cities or airports. Airport codes are 3-letter IATA codes (infer the major \
airport when given a city name, e.g. 'Los Angeles' -> 'LAX', 'New York' -> \
'JFK'). Dates must be YYYY-MM-DD. If origin, destination, or date is \
missing, ask the user instead of guessing.";

/// Chat tool backed by a [`FlightService`].
pub struct FlightSearchTool {
    service: Arc<FlightService>,
}

impl FlightSearchTool {
    /// Wrap a flight service.
    #[must_use]
    pub fn new(service: Arc<FlightService>) -> Self {
        Self { service }
    }

    fn parse(args: &Value) -> Result<(FlightQuery, SearchOptions), String> {
        let origin = require_string(args, "origin")?;
        let destination = require_string(args, "destination")?;
        let departure_date = require_string(args, "departure_date")?;

        let departure_date = NaiveDate::parse_from_str(&departure_date, "%Y-%m-%d")
            .map_err(|_| {
                format!(
                    "Error: Invalid date format '{departure_date}'. \
                     Please use YYYY-MM-DD format (e.g., '2025-06-15')."
                )
            })?;

        let passengers = optional_i64(args, "passengers").unwrap_or(1);
        if !(1..=9).contains(&passengers) {
            return Err("Error: Number of passengers must be between 1 and 9.".into());
        }

        let sort_by = match optional_string(args, "sort_by") {
            None => SortBy::Price,
            Some(s) => SortBy::parse(&s).ok_or_else(|| {
                format!(
                    "Error: Invalid sort_by '{s}'. \
                     Must be 'price', 'duration', or 'departure'."
                )
            })?,
        };

        let limit = optional_i64(args, "limit").unwrap_or(DEFAULT_TOOL_LIMIT);
        if !(1..=20).contains(&limit) {
            return Err("Error: Limit must be between 1 and 20.".into());
        }

        let max_stops = optional_i64(args, "max_stops");
        if let Some(stops) = max_stops
            && !(0..=2).contains(&stops)
        {
            return Err("Error: max_stops must be 0 (direct), 1, or 2.".into());
        }

        let max_duration = optional_i64(args, "max_duration");
        if let Some(duration) = max_duration
            && duration <= 0
        {
            return Err("Error: max_duration must be a positive number of minutes.".into());
        }

        let max_price = optional_f64(args, "max_price");
        if let Some(price) = max_price
            && price <= 0.0
        {
            return Err("Error: max_price must be a positive number.".into());
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let query = FlightQuery {
            origin,
            destination,
            departure_date,
            return_date: None,
            passengers: passengers as u8,
            booking_class: Default::default(),
        };
        let query = query.normalized().map_err(|e| format!("Error: {e}"))?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let options = SearchOptions {
            sort_by,
            max_price,
            max_duration: max_duration.map(|d| d as u32),
            max_stops: max_stops.map(|s| s as u8),
            limit: limit as usize,
            offset: 0,
        };
        Ok((query, options))
    }

    fn format_results(query: &FlightQuery, flights: &[Flight]) -> String {
        if flights.is_empty() {
            return format!(
                "No flights found from {} to {} on {} matching your criteria.",
                query.origin, query.destination, query.departure_date
            );
        }

        let mut out = format!(
            "Found {} flight(s) from {} to {} on {}:\n",
            flights.len(),
            query.origin,
            query.destination,
            query.departure_date
        );
        for (i, flight) in flights.iter().enumerate() {
            let hours = flight.duration_minutes / 60;
            let minutes = flight.duration_minutes % 60;
            let duration = if minutes > 0 {
                format!("{hours}h {minutes}m")
            } else {
                format!("{hours}h")
            };
            let stops = match flight.stops {
                0 => "Direct".to_owned(),
                1 => "1 stop".to_owned(),
                n => format!("{n} stops"),
            };
            let _ = write!(
                out,
                "\n{num}. {carrier} {flight_number}\n   \
                 Departs: {departs} -> Arrives: {arrives}\n   \
                 Duration: {duration} ({stops})\n   \
                 Price: ${price:.2} {currency} ({class})\n   \
                 Flight ID: {id}\n",
                num = i + 1,
                carrier = flight.carrier,
                flight_number = flight.flight_number,
                departs = flight.departure.format("%I:%M %p"),
                arrives = flight.arrival.format("%I:%M %p"),
                price = flight.price,
                currency = flight.currency,
                class = flight.booking_class.as_str(),
                id = flight.id,
            );
        }
        out
    }
}

#[async_trait]
impl ChatTool for FlightSearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(TOOL_NAME, DESCRIPTION)
            .required(
                "origin",
                json!({"type": "string", "description": "Origin airport IATA code, e.g. 'LAX'"}),
            )
            .required(
                "destination",
                json!({"type": "string", "description": "Destination airport IATA code, e.g. 'JFK'"}),
            )
            .required(
                "departure_date",
                json!({"type": "string", "description": "Departure date, YYYY-MM-DD"}),
            )
            .optional(
                "passengers",
                json!({"type": "integer", "description": "Number of passengers, 1-9 (default 1)"}),
            )
            .optional(
                "sort_by",
                json!({
                    "type": "string",
                    "enum": ["price", "duration", "departure"],
                    "description": "Sort order (default 'price')"
                }),
            )
            .optional(
                "max_price",
                json!({"type": "number", "description": "Maximum price in USD"}),
            )
            .optional(
                "max_duration",
                json!({"type": "integer", "description": "Maximum duration in minutes"}),
            )
            .optional(
                "max_stops",
                json!({"type": "integer", "description": "Maximum stops: 0 (direct), 1, or 2"}),
            )
            .optional(
                "limit",
                json!({"type": "integer", "description": "Maximum results, 1-20 (default 5)"}),
            )
            .build()
    }

    #[instrument(skip_all)]
    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let (query, options) = match Self::parse(&args) {
            Ok(parsed) => parsed,
            Err(message) => return Ok(message),
        };

        match self.service.search_flights(&query, &options).await {
            Ok(flights) => {
                info!(
                    origin = %query.origin,
                    destination = %query.destination,
                    results = flights.len(),
                    "flight search succeeded"
                );
                Ok(Self::format_results(&query, &flights))
            }
            Err(FlightError::InvalidQuery(reason)) => Ok(format!("Error: {reason}")),
            Err(FlightError::NotFound(id)) => Ok(format!("Error: Flight {id} not found.")),
            Err(FlightError::Backend { message, retryable }) => {
                Err(ToolError::Backend { message, retryable })
            }
        }
    }
}
