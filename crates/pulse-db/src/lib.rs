//! Event store for the Urban Pulse risk engine.
//!
//! Safety events are written once at ingestion and read many times: by the
//! map (bounding-box queries) and by route scoring (radius lookups around
//! every sample point). Two backends share one set of semantics:
//!
//! ```text
//! EventStore (lookup timeout, NearbyLookup impl)
//!     |
//!     +-- Postgres --> PgEventStore     (safety_events table)
//!     |
//!     +-- Memory ----> MemoryEventStore (dev, tests, demo mode)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`event_store`] -- `safety_events` inserts and queries
//! - [`memory`] -- In-process backend with identical semantics
//! - [`store`] -- Backend dispatch and the degraded-lookup contract
//! - [`demo`] -- Sample NYC events for demo mode
//! - [`error`] -- Shared error types

pub mod demo;
pub mod error;
pub mod event_store;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export primary types for convenience.
pub use demo::demo_events;
pub use error::DbError;
pub use event_store::{EventRow, PgEventStore};
pub use memory::MemoryEventStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::{
    DEFAULT_LOOKUP_TIMEOUT, EventBackend, EventQuery, EventStore, MAX_NEARBY_EVENTS,
    MAX_QUERY_LIMIT,
};
