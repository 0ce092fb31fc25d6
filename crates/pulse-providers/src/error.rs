//! Error types for the map service clients.

/// Errors from the directions service.
///
/// Geocoding never errors; see [`crate::GeocodeOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP call failed or returned a non-success status code.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-`OK` application status.
    #[error("directions service returned status {0}")]
    Status(String),

    /// The response body did not have the expected shape.
    #[error("response parse error: {0}")]
    Parse(String),

    /// The service found no route between the two points.
    #[error("no route found")]
    NoRoutes,

    /// The provider is missing configuration (API key, client setup).
    #[error("config error: {0}")]
    Config(String),
}
