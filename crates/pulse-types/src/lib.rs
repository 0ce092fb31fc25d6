//! Shared type definitions for the Urban Pulse risk engine.
//!
//! This crate is the single source of truth for the values that flow
//! between the event store, the risk engine, the route provider and the
//! HTTP API. Types flow downstream to `TypeScript` via `ts-rs` for the map
//! frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for stored events
//! - [`geo`] -- Coordinates and bounding boxes (WGS-84 degrees)
//! - [`enums`] -- Event categories, route preference, travel mode
//! - [`event`] -- Classified ingestion payloads and stored safety events
//! - [`route`] -- Route candidates and scored routes

pub mod enums;
pub mod event;
pub mod geo;
pub mod ids;
pub mod route;

// Re-export all public types at crate root for convenience.
pub use enums::{EventType, Preference, TravelMode};
pub use event::{ClassifiedEvent, SafetyEvent, Severity};
pub use geo::{BoundingBox, Coordinate};
pub use ids::EventId;
pub use route::{RouteCandidate, ScoredRoute};
