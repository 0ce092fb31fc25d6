//! Backend dispatch and the nearby-lookup contract.
//!
//! [`EventStore`] is what the rest of the system holds. It forwards to one
//! of the concrete backends and adds the one behavior route scoring relies
//! on: a lookup that fails or runs past [`EventStore::lookup_timeout`]
//! reports [`Lookup::Degraded`] instead of an error.

use std::time::Duration;

use chrono::{DateTime, Utc};
use pulse_risk::{Lookup, NearbyLookup};
use pulse_types::{BoundingBox, Coordinate, SafetyEvent};

use crate::error::DbError;
use crate::event_store::PgEventStore;
use crate::memory::MemoryEventStore;

/// Hard cap on the number of events one [`EventQuery`] returns.
pub const MAX_QUERY_LIMIT: usize = 10_000;

/// Hard cap on the number of events one nearby lookup returns.
pub const MAX_NEARBY_EVENTS: usize = 1_000;

/// Default bound on a single nearby lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Filter for listing stored events. Results are newest first.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventQuery {
    /// Only events inside this box (inclusive).
    pub bbox: Option<BoundingBox>,
    /// Only events that occurred at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Maximum rows; clamped to [`MAX_QUERY_LIMIT`].
    pub limit: Option<usize>,
}

impl EventQuery {
    /// The row limit actually applied.
    pub fn effective_limit(&self) -> usize {
        self.limit.map_or(MAX_QUERY_LIMIT, |limit| limit.min(MAX_QUERY_LIMIT))
    }

    /// Whether an event passes the box and time filters.
    pub fn matches(&self, event: &SafetyEvent) -> bool {
        self.bbox.is_none_or(|bbox| bbox.contains(event.coordinates))
            && self.since.is_none_or(|since| event.timestamp >= since)
    }
}

/// The concrete storage behind an [`EventStore`].
#[derive(Debug, Clone)]
pub enum EventBackend {
    /// `safety_events` table in `PostgreSQL`.
    Postgres(PgEventStore),
    /// In-process vector.
    Memory(MemoryEventStore),
}

/// Shared handle to the event store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventStore {
    backend: EventBackend,
    lookup_timeout: Duration,
}

impl EventStore {
    /// Wrap a backend with the default lookup timeout.
    pub const fn new(backend: EventBackend) -> Self {
        Self {
            backend,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// An empty in-memory store.
    pub fn memory() -> Self {
        Self::new(EventBackend::Memory(MemoryEventStore::new()))
    }

    /// A store backed by the given `PostgreSQL` event table.
    pub const fn postgres(store: PgEventStore) -> Self {
        Self::new(EventBackend::Postgres(store))
    }

    /// Set the bound on a single nearby lookup.
    #[must_use]
    pub const fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// The bound on a single nearby lookup.
    pub const fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Name of the active backend, for logs and `/health`.
    pub const fn backend_name(&self) -> &'static str {
        match self.backend {
            EventBackend::Postgres(_) => "postgres",
            EventBackend::Memory(_) => "memory",
        }
    }

    /// Persist one event.
    pub async fn insert(&self, event: &SafetyEvent) -> Result<(), DbError> {
        match &self.backend {
            EventBackend::Postgres(store) => store.insert(event).await,
            EventBackend::Memory(store) => {
                store.insert(event.clone()).await;
                Ok(())
            }
        }
    }

    /// Persist many events.
    pub async fn batch_insert(&self, events: &[SafetyEvent]) -> Result<(), DbError> {
        match &self.backend {
            EventBackend::Postgres(store) => store.batch_insert(events).await,
            EventBackend::Memory(store) => {
                store.batch_insert(events).await;
                Ok(())
            }
        }
    }

    /// List events matching `query`, newest first.
    pub async fn query(&self, query: &EventQuery) -> Result<Vec<SafetyEvent>, DbError> {
        match &self.backend {
            EventBackend::Postgres(store) => store.query(query).await,
            EventBackend::Memory(store) => Ok(store.query(query).await),
        }
    }

    /// Events within `radius_meters` of `center`, newest first.
    ///
    /// Unlike the [`NearbyLookup`] impl this has no timeout and surfaces
    /// errors.
    pub async fn find_nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<Vec<SafetyEvent>, DbError> {
        match &self.backend {
            EventBackend::Postgres(store) => store.find_nearby(center, radius_meters).await,
            EventBackend::Memory(store) => Ok(store.find_nearby(center, radius_meters).await),
        }
    }
}

impl NearbyLookup for EventStore {
    async fn nearby(&self, center: Coordinate, radius_meters: f64) -> Lookup {
        match tokio::time::timeout(self.lookup_timeout, self.find_nearby(center, radius_meters))
            .await
        {
            Ok(Ok(events)) => Lookup::Found(events),
            Ok(Err(e)) => {
                tracing::warn!(
                    lat = center.lat,
                    lng = center.lng,
                    error = %e,
                    "Nearby lookup failed, sample degraded"
                );
                Lookup::Degraded(e.to_string())
            }
            Err(_) => {
                let timeout_ms = self.lookup_timeout.as_millis();
                tracing::warn!(
                    lat = center.lat,
                    lng = center.lng,
                    timeout_ms,
                    "Nearby lookup timed out, sample degraded"
                );
                Lookup::Degraded(format!("lookup timed out after {timeout_ms} ms"))
            }
        }
    }
}
