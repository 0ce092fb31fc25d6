//! Risk scoring and route-risk aggregation for Urban Pulse.
//!
//! This crate turns classified, geolocated events into numeric safety
//! scores and compares candidate routes by distance and nearby risk. It is
//! pure: every function takes `now` explicitly and the only external
//! dependency is the nearby-event lookup, supplied by the caller.
//!
//! # Data flow
//!
//! ```text
//! RouteCandidate --> polyline::decode --> aggregate (scorer per event, lookup per sample)
//!                                               |
//!                                               v
//!                        select::normalize --> select::select_route --> caller
//! ```
//!
//! # Modules
//!
//! - [`geodesy`] -- Haversine great-circle distance and radius search boxes.
//! - [`polyline`] -- Encoded polyline codec (lenient decode, encode).
//! - [`scorer`] -- Per-event risk score with recency decay and keyword tiers.
//! - [`aggregate`] -- Route sampling, nearby-event lookups, weighted averaging.
//! - [`select`] -- Min/max normalization and preference-based selection.
//! - [`evaluate`] -- Decode + aggregate for whole candidate sets, concurrently.
//! - [`error`] -- Error types.

pub mod aggregate;
pub mod error;
pub mod evaluate;
pub mod geodesy;
pub mod polyline;
pub mod scorer;
pub mod select;

// Re-export primary operations at crate root.
pub use aggregate::{
    DEFAULT_RADIUS_METERS, Lookup, NearbyLookup, RouteRisk, aggregate_risk,
    aggregate_risk_concurrent, sample_points,
};
pub use error::{PolylineError, RiskError};
pub use evaluate::{evaluate_routes, score_route};
pub use geodesy::{distance_meters, search_boxes};
pub use scorer::{RiskInput, score};
pub use select::{Weights, normalize, select_index, select_route};
