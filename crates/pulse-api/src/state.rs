//! Shared application state for the API server.

use chrono::{DateTime, Utc};
use pulse_db::EventStore;
use pulse_providers::{Geocoder, RouteProvider};
use pulse_risk::DEFAULT_RADIUS_METERS;

/// Default look-back window for `GET /api/events`, in hours.
pub const DEFAULT_SINCE_HOURS: i64 = 24;

/// Source of the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// The system wall clock.
    #[default]
    System,
    /// A frozen instant (tests, replays).
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// The current instant according to this clock.
    pub fn now(self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => at,
        }
    }
}

/// Tunables for event listing and route scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSettings {
    /// Search radius around each route sample point, in meters.
    pub radius_meters: f64,
    /// Look-back window when a listing request does not give one.
    pub default_since_hours: i64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            default_since_hours: DEFAULT_SINCE_HOURS,
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`std::sync::Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Safety event storage.
    pub store: EventStore,
    /// Candidate route source.
    pub routes: RouteProvider,
    /// Place-name resolver used at ingestion.
    pub geocoder: Geocoder,
    /// Scoring tunables.
    pub risk: RiskSettings,
    /// Time source.
    pub clock: Clock,
}

impl AppState {
    /// Create a state with default settings and the system clock.
    pub fn new(store: EventStore, routes: RouteProvider, geocoder: Geocoder) -> Self {
        Self {
            store,
            routes,
            geocoder,
            risk: RiskSettings::default(),
            clock: Clock::System,
        }
    }

    /// Replace the scoring tunables.
    #[must_use]
    pub const fn with_risk(mut self, risk: RiskSettings) -> Self {
        self.risk = risk;
        self
    }

    /// Replace the time source.
    #[must_use]
    pub const fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}
