//! External map services for the Urban Pulse risk engine.
//!
//! Two collaborators sit outside the engine: a directions service that turns
//! an origin and destination into candidate routes, and a geocoder that turns
//! free-text place names into coordinates. Both use enum dispatch so the
//! server can swap the Google web services for fixed offline data without
//! trait objects.
//!
//! # Modules
//!
//! - [`config`] -- Endpoint URLs, API key and timeout
//! - [`directions`] -- [`RouteProvider`] and the Directions API client
//! - [`geocode`] -- [`Geocoder`] and the Geocoding API client
//! - [`error`] -- Shared error types

pub mod config;
pub mod directions;
pub mod error;
pub mod geocode;

pub use config::GoogleConfig;
pub use directions::{DirectionsClient, RouteProvider, RouteQuery, parse_directions};
pub use error::ProviderError;
pub use geocode::{GeocodeOutcome, Geocoder, GeocodingClient, parse_geocode};
