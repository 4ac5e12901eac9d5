//! Flight backend abstraction and the mock implementation.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;
use chrono::{Duration, NaiveTime, TimeZone, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::flight::models::{BookingClass, Flight, FlightError, FlightQuery};

/// Backend that produces flight data.
#[async_trait]
pub trait FlightClient: Send + Sync {
    /// Search for flights matching the query. Results are sorted by
    /// price, cheapest first.
    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, FlightError>;

    /// Fetch one flight previously returned by [`search`](Self::search).
    async fn get_flight_details(&self, flight_id: &str) -> Result<Flight, FlightError>;

    /// Whether the flight can still be booked.
    async fn check_availability(&self, flight_id: &str) -> Result<bool, FlightError>;
}

/// Major US carriers with their flight number prefixes.
const AIRLINES: [(&str, &str); 8] = [
    ("American Airlines", "AA"),
    ("United Airlines", "UA"),
    ("Delta Air Lines", "DL"),
    ("Southwest Airlines", "WN"),
    ("JetBlue Airways", "B6"),
    ("Alaska Airlines", "AS"),
    ("Spirit Airlines", "NK"),
    ("Frontier Airlines", "F9"),
];

/// Approximate distances between major airports, in miles.
const AIRPORT_DISTANCES: [((&str, &str), u32); 10] = [
    (("LAX", "JFK"), 2475),
    (("LAX", "SFO"), 337),
    (("LAX", "SEA"), 954),
    (("LAX", "ORD"), 1745),
    (("JFK", "SFO"), 2586),
    (("JFK", "ORD"), 740),
    (("JFK", "MIA"), 1089),
    (("SFO", "SEA"), 679),
    (("ORD", "DFW"), 802),
    (("ORD", "ATL"), 606),
];

struct MockState {
    rng: StdRng,
    cache: HashMap<String, Flight>,
}

/// In-process flight backend returning realistic dummy data.
///
/// Generates 3 to 8 options per search with varied carriers, departure
/// times spread across the day, 0 to 2 stops weighted by route length,
/// and prices derived from distance tier, cabin class, and stop count.
/// Results are remembered so detail and availability lookups resolve.
pub struct MockFlightClient {
    state: Mutex<MockState>,
}

impl MockFlightClient {
    /// Client seeded from the OS, different data every run.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                rng: StdRng::from_os_rng(),
                cache: HashMap::new(),
            }),
        }
    }

    /// Client with a fixed seed, reproducible data for tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                rng: StdRng::seed_from_u64(seed),
                cache: HashMap::new(),
            }),
        }
    }

    /// Distance in miles between two airports.
    ///
    /// Known routes come from the lookup table (either direction).
    /// Unknown routes hash to a stable 500 to 3000 mile estimate so the
    /// same pair always lands in the same distance tier.
    fn estimate_distance(origin: &str, destination: &str) -> u32 {
        for ((a, b), miles) in AIRPORT_DISTANCES {
            if (a == origin && b == destination) || (a == destination && b == origin) {
                return miles;
            }
        }
        let mut hasher = DefaultHasher::new();
        origin.hash(&mut hasher);
        destination.hash(&mut hasher);
        500 + (hasher.finish() % 2500) as u32
    }

    fn generate_flight(state: &mut MockState, query: &FlightQuery, distance: u32) -> Flight {
        let rng = &mut state.rng;

        let (carrier, prefix) = AIRLINES[rng.random_range(0..AIRLINES.len())];
        let flight_number = format!("{prefix}{}", rng.random_range(100..=9999));

        // Departures spread from 6am to 10pm on the quarter hour.
        let hour = rng.random_range(6..=22);
        let minute = [0, 15, 30, 45][rng.random_range(0..4)];
        let departure = Utc.from_utc_datetime(
            &query
                .departure_date
                .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()),
        );

        // Shorter routes are less likely to connect.
        let stops = if distance < 1000 {
            weighted_pick(rng, &[(0, 0.8), (1, 0.2)])
        } else if distance < 2500 {
            weighted_pick(rng, &[(0, 0.5), (1, 0.4), (2, 0.1)])
        } else {
            weighted_pick(rng, &[(0, 0.3), (1, 0.5), (2, 0.2)])
        };

        // ~500 mph cruise plus 45-90 minutes per stop.
        let base_duration = distance / 500 * 60 + (distance % 500) * 60 / 500;
        let stop_penalty = u32::from(stops) * rng.random_range(45..=90);
        let duration_minutes = base_duration + stop_penalty;
        let arrival = departure + Duration::minutes(i64::from(duration_minutes));

        let price = Self::calculate_price(rng, distance, query.booking_class, stops);

        let flight = Flight {
            id: uuid::Uuid::now_v7().to_string(),
            origin: query.origin.clone(),
            destination: query.destination.clone(),
            departure,
            arrival,
            price,
            currency: "USD".into(),
            carrier: carrier.into(),
            flight_number,
            duration_minutes,
            stops,
            booking_class: query.booking_class,
        };
        let _ = state.cache.insert(flight.id.clone(), flight.clone());
        flight
    }

    fn calculate_price(
        rng: &mut StdRng,
        distance: u32,
        booking_class: BookingClass,
        stops: u8,
    ) -> f64 {
        let (min_price, max_price) = if distance < 1000 {
            (120.0, 300.0)
        } else if distance < 2500 {
            (250.0, 600.0)
        } else {
            (400.0, 1200.0)
        };
        let mut price: f64 = rng.random_range(min_price..=max_price);
        price *= booking_class.price_multiplier();

        // Direct flights carry a convenience premium, two-stop routings
        // a discount.
        match stops {
            0 => price *= 1.2,
            2 => price *= 0.85,
            _ => {}
        }

        price *= rng.random_range(0.9..=1.1);
        (price * 100.0).round() / 100.0
    }
}

impl Default for MockFlightClient {
    fn default() -> Self {
        Self::new()
    }
}

fn weighted_pick(rng: &mut StdRng, choices: &[(u8, f64)]) -> u8 {
    let total: f64 = choices.iter().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0.0..total);
    for &(value, weight) in choices {
        if roll < weight {
            return value;
        }
        roll -= weight;
    }
    choices.last().map_or(0, |&(value, _)| value)
}

#[async_trait]
impl FlightClient for MockFlightClient {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>, FlightError> {
        let distance = Self::estimate_distance(&query.origin, &query.destination);
        let mut state = self.state.lock();
        let count = state.rng.random_range(3..=8);
        let mut flights: Vec<Flight> = (0..count)
            .map(|_| Self::generate_flight(&mut state, query, distance))
            .collect();
        flights.sort_by(|a, b| a.price.total_cmp(&b.price));
        Ok(flights)
    }

    async fn get_flight_details(&self, flight_id: &str) -> Result<Flight, FlightError> {
        self.state
            .lock()
            .cache
            .get(flight_id)
            .cloned()
            .ok_or_else(|| FlightError::NotFound(flight_id.to_owned()))
    }

    async fn check_availability(&self, flight_id: &str) -> Result<bool, FlightError> {
        let mut state = self.state.lock();
        if !state.cache.contains_key(flight_id) {
            return Ok(false);
        }
        // 90% of cached flights remain bookable.
        Ok(state.rng.random::<f64>() < 0.9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, Timelike};

    fn query(origin: &str, destination: &str) -> FlightQuery {
        FlightQuery {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            return_date: None,
            passengers: 1,
            booking_class: BookingClass::Economy,
        }
    }

    #[tokio::test]
    async fn search_returns_three_to_eight_sorted_by_price() {
        let client = MockFlightClient::with_seed(42);
        let flights = client.search(&query("LAX", "JFK")).await.unwrap();
        assert!((3..=8).contains(&flights.len()));
        for pair in flights.windows(2) {
            assert!(pair[0].price <= pair[1].price);
        }
    }

    #[tokio::test]
    async fn generated_flights_match_the_query() {
        let client = MockFlightClient::with_seed(7);
        let flights = client.search(&query("SFO", "SEA")).await.unwrap();
        for f in &flights {
            assert_eq!(f.origin, "SFO");
            assert_eq!(f.destination, "SEA");
            assert_eq!(f.currency, "USD");
            assert_eq!(f.departure.date_naive().to_string(), "2025-06-15");
            assert!((6..=22).contains(&f.departure.hour()));
            assert!(f.stops <= 2);
            assert_eq!(
                f.arrival - f.departure,
                Duration::minutes(i64::from(f.duration_minutes))
            );
        }
    }

    #[tokio::test]
    async fn seeded_clients_are_reproducible() {
        let a = MockFlightClient::with_seed(99);
        let b = MockFlightClient::with_seed(99);
        let fa = a.search(&query("LAX", "ORD")).await.unwrap();
        let fb = b.search(&query("LAX", "ORD")).await.unwrap();
        let ids_stripped =
            |fs: &[Flight]| fs.iter().map(|f| (f.price, f.carrier.clone())).collect::<Vec<_>>();
        assert_eq!(ids_stripped(&fa), ids_stripped(&fb));
    }

    #[tokio::test]
    async fn details_resolve_for_searched_flights() {
        let client = MockFlightClient::with_seed(1);
        let flights = client.search(&query("JFK", "MIA")).await.unwrap();
        let details = client.get_flight_details(&flights[0].id).await.unwrap();
        assert_eq!(details, flights[0]);
    }

    #[tokio::test]
    async fn details_for_unknown_id_is_not_found() {
        let client = MockFlightClient::with_seed(1);
        let err = client.get_flight_details("nope").await.unwrap_err();
        assert_matches!(err, FlightError::NotFound(id) if id == "nope");
    }

    #[tokio::test]
    async fn availability_false_for_unknown_id() {
        let client = MockFlightClient::with_seed(1);
        assert!(!client.check_availability("nope").await.unwrap());
    }

    #[test]
    fn distance_lookup_is_symmetric() {
        assert_eq!(MockFlightClient::estimate_distance("LAX", "JFK"), 2475);
        assert_eq!(MockFlightClient::estimate_distance("JFK", "LAX"), 2475);
    }

    #[test]
    fn unknown_route_distance_is_stable_and_bounded() {
        let d1 = MockFlightClient::estimate_distance("AAA", "ZZZ");
        let d2 = MockFlightClient::estimate_distance("AAA", "ZZZ");
        assert_eq!(d1, d2);
        assert!((500..3000).contains(&d1));
    }

    #[test]
    fn price_scales_with_booking_class() {
        // Same rng seed for each class isolates the multiplier.
        let economy = MockFlightClient::calculate_price(
            &mut StdRng::seed_from_u64(5),
            800,
            BookingClass::Economy,
            0,
        );
        let first = MockFlightClient::calculate_price(
            &mut StdRng::seed_from_u64(5),
            800,
            BookingClass::First,
            0,
        );
        assert!((first / economy - 5.0).abs() < 1e-6);
    }
}
