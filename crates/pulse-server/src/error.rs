//! Error types for the server binary.
//!
//! [`StartupError`] is the top-level error type that wraps all possible
//! failure modes between reading the config file and serving requests.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The event store could not be opened, migrated or seeded.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: pulse_db::DbError,
    },

    /// A map service client could not be built.
    #[error("provider error: {source}")]
    Provider {
        /// The underlying provider error.
        #[from]
        source: pulse_providers::ProviderError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: pulse_api::ServerError,
    },
}
