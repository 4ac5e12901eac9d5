//! Flight domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flight domain failures.
#[derive(Debug, Error)]
pub enum FlightError {
    /// No flight with this id in the backend.
    #[error("flight {0} not found")]
    NotFound(String),

    /// The query failed validation.
    #[error("invalid flight query: {0}")]
    InvalidQuery(String),

    /// The flight backend failed.
    #[error("flight backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
        /// Whether the failure is transient.
        retryable: bool,
    },
}

/// Cabin class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingClass {
    /// Standard cabin.
    #[default]
    Economy,
    /// Extra legroom cabin.
    PremiumEconomy,
    /// Business cabin.
    Business,
    /// First class.
    First,
}

impl BookingClass {
    /// Price multiplier relative to economy.
    #[must_use]
    pub fn price_multiplier(self) -> f64 {
        match self {
            Self::Economy => 1.0,
            Self::PremiumEconomy => 1.5,
            Self::Business => 3.0,
            Self::First => 5.0,
        }
    }

    /// Wire name (matches the serde representation).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::PremiumEconomy => "premium_economy",
            Self::Business => "business",
            Self::First => "first",
        }
    }
}

/// Sort criterion for search results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Cheapest first.
    #[default]
    Price,
    /// Shortest first.
    Duration,
    /// Earliest departure first.
    Departure,
}

impl SortBy {
    /// Parse a user-supplied sort name, case-insensitive.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "price" => Some(Self::Price),
            "duration" => Some(Self::Duration),
            "departure" => Some(Self::Departure),
            _ => None,
        }
    }
}

/// Flight search parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightQuery {
    /// Origin airport IATA code (3 letters).
    pub origin: String,
    /// Destination airport IATA code (3 letters).
    pub destination: String,
    /// Departure date.
    pub departure_date: NaiveDate,
    /// Return date for round trips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    /// Number of passengers (1–9).
    #[serde(default = "default_passengers")]
    pub passengers: u8,
    /// Cabin class.
    #[serde(default)]
    pub booking_class: BookingClass,
}

fn default_passengers() -> u8 {
    1
}

/// Whether `code` is a syntactically valid IATA airport code.
#[must_use]
pub fn is_iata_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

impl FlightQuery {
    /// Uppercase the airport codes and check every field.
    ///
    /// Returns the normalized query or a human-readable reason.
    pub fn normalized(mut self) -> Result<Self, FlightError> {
        self.origin = self.origin.to_ascii_uppercase();
        self.destination = self.destination.to_ascii_uppercase();
        if !is_iata_code(&self.origin) {
            return Err(FlightError::InvalidQuery(format!(
                "origin '{}' is not a 3-letter IATA code",
                self.origin
            )));
        }
        if !is_iata_code(&self.destination) {
            return Err(FlightError::InvalidQuery(format!(
                "destination '{}' is not a 3-letter IATA code",
                self.destination
            )));
        }
        if !(1..=9).contains(&self.passengers) {
            return Err(FlightError::InvalidQuery(
                "passengers must be between 1 and 9".into(),
            ));
        }
        if let Some(ret) = self.return_date
            && ret <= self.departure_date
        {
            return Err(FlightError::InvalidQuery(
                "return date must be after departure date".into(),
            ));
        }
        Ok(self)
    }
}

/// One flight option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Unique flight identifier.
    pub id: String,
    /// Origin IATA code.
    pub origin: String,
    /// Destination IATA code.
    pub destination: String,
    /// Departure time (UTC).
    pub departure: DateTime<Utc>,
    /// Arrival time (UTC).
    pub arrival: DateTime<Utc>,
    /// Price in `currency` units.
    pub price: f64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Airline name.
    pub carrier: String,
    /// Flight number, e.g. `AA123`.
    pub flight_number: String,
    /// Total duration in minutes.
    pub duration_minutes: u32,
    /// Number of stops (0 for direct).
    pub stops: u8,
    /// Cabin class.
    pub booking_class: BookingClass,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> FlightQuery {
        FlightQuery {
            origin: "lax".into(),
            destination: "jfk".into(),
            departure_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            return_date: None,
            passengers: 1,
            booking_class: BookingClass::Economy,
        }
    }

    #[test]
    fn normalized_uppercases_codes() {
        let q = query().normalized().unwrap();
        assert_eq!(q.origin, "LAX");
        assert_eq!(q.destination, "JFK");
    }

    #[test]
    fn rejects_bad_iata_codes() {
        let mut q = query();
        q.origin = "L1X".into();
        assert!(q.normalized().is_err());

        let mut q = query();
        q.destination = "NEWARK".into();
        assert!(q.normalized().is_err());
    }

    #[test]
    fn rejects_passenger_bounds() {
        let mut q = query();
        q.passengers = 0;
        assert!(q.normalized().is_err());
        let mut q = query();
        q.passengers = 10;
        assert!(q.normalized().is_err());
        let mut q = query();
        q.passengers = 9;
        assert!(q.normalized().is_ok());
    }

    #[test]
    fn rejects_return_before_departure() {
        let mut q = query();
        q.return_date = NaiveDate::from_ymd_opt(2025, 6, 15);
        assert!(q.normalized().is_err());

        let mut q = query();
        q.return_date = NaiveDate::from_ymd_opt(2025, 6, 20);
        assert!(q.normalized().is_ok());
    }

    #[test]
    fn booking_class_multipliers_ordered() {
        assert!(
            BookingClass::Economy.price_multiplier()
                < BookingClass::PremiumEconomy.price_multiplier()
        );
        assert!(
            BookingClass::Business.price_multiplier() < BookingClass::First.price_multiplier()
        );
    }

    #[test]
    fn booking_class_serde_names() {
        let v = serde_json::to_value(BookingClass::PremiumEconomy).unwrap();
        assert_eq!(v, "premium_economy");
        assert_eq!(BookingClass::PremiumEconomy.as_str(), "premium_economy");
    }

    #[test]
    fn sort_by_parse_case_insensitive() {
        assert_eq!(SortBy::parse("Price"), Some(SortBy::Price));
        assert_eq!(SortBy::parse("DURATION"), Some(SortBy::Duration));
        assert_eq!(SortBy::parse("departure"), Some(SortBy::Departure));
        assert_eq!(SortBy::parse("altitude"), None);
    }

    #[test]
    fn iata_code_check() {
        assert!(is_iata_code("LAX"));
        assert!(is_iata_code("sfo"));
        assert!(!is_iata_code("LA"));
        assert!(!is_iata_code("L4X"));
        assert!(!is_iata_code("LAXX"));
    }

    #[test]
    fn query_deserializes_with_defaults() {
        let q: FlightQuery = serde_json::from_str(
            r#"{"origin":"LAX","destination":"JFK","departure_date":"2025-06-15"}"#,
        )
        .unwrap();
        assert_eq!(q.passengers, 1);
        assert_eq!(q.booking_class, BookingClass::Economy);
        assert!(q.return_date.is_none());
    }
}
