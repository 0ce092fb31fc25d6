//! Route candidates supplied by the route provider and their scored form.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geo::Coordinate;

/// One alternative route as returned by the route provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RouteCandidate {
    /// Encoded polyline of the route geometry (1e5 fixed point).
    pub encoded_path: String,
    /// Total route length in meters.
    pub distance_meters: f64,
    /// Total travel time in seconds.
    pub duration_seconds: f64,
}

/// A route candidate with its decoded geometry and risk metrics.
///
/// Created fresh per scoring call and discarded after selection. The
/// normalized metrics are only meaningful relative to the candidate set
/// they were normalized against; they stay `0.0` until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScoredRoute {
    /// The provider's candidate.
    pub candidate: RouteCandidate,
    /// Decoded route geometry in path order (empty if the polyline was malformed).
    pub coordinates: Vec<Coordinate>,
    /// Average weighted nearby-event risk per sample point, in `[0, 100]`.
    pub aggregate_risk: f64,
    /// Number of (sample, event) pairs within the search radius.
    pub event_count: u32,
    /// Number of sample points evaluated.
    pub samples: u32,
    /// Samples whose nearby-event lookup failed and counted as empty.
    pub degraded_samples: u32,
    /// Distance rescaled to `[0, 1]` across the candidate set.
    pub normalized_distance: f64,
    /// Aggregate risk rescaled to `[0, 1]` across the candidate set.
    pub normalized_risk: f64,
}

impl ScoredRoute {
    /// Distance used for normalization.
    pub const fn distance_meters(&self) -> f64 {
        self.candidate.distance_meters
    }

    /// Duration used by the `fastest` preference.
    pub const fn duration_seconds(&self) -> f64 {
        self.candidate.duration_seconds
    }
}
