//! Error types for the event store.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors with additional context about which operation failed.

/// Errors that can occur in the event store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored row could not be turned back into an event.
    #[error("Invalid row {id}: {reason}")]
    InvalidRow {
        /// Primary key of the offending row.
        id: uuid::Uuid,
        /// What was wrong with it.
        reason: String,
    },
}
