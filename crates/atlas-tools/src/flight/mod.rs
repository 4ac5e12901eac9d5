//! Flight search domain: models, backend client trait + mock, service
//! layer, and the `search_flights` chat tool.

pub mod client;
pub mod models;
pub mod search_tool;
pub mod service;

pub use client::{FlightClient, MockFlightClient};
pub use models::{BookingClass, Flight, FlightError, FlightQuery, SortBy};
pub use search_tool::FlightSearchTool;
pub use service::{FlightService, SearchOptions};
