//! HTTP API for the Urban Pulse risk engine.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Event endpoints** for listing stored safety events inside a map
//!   viewport and ingesting newly classified events
//! - **Route endpoint** that fetches candidate routes, scores each against
//!   nearby events and returns the preferred one with its alternatives
//! - **Health endpoint** reporting the configured backends
//!
//! # Architecture
//!
//! Handlers share one [`AppState`] holding the event store, the route
//! provider, the geocoder and a [`Clock`]. The clock is read once per
//! request and the resulting instant is threaded through scoring, so a
//! single request never mixes two notions of "now".

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, Clock, RiskSettings};
