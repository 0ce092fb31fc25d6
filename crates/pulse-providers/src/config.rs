//! Configuration for the Google Maps web service clients.

use std::time::Duration;

/// Default Directions API endpoint.
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Default Geocoding API endpoint.
pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials and endpoints for the Google Maps clients.
#[derive(Clone)]
pub struct GoogleConfig {
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Directions endpoint.
    pub directions_url: String,
    /// Geocoding endpoint.
    pub geocode_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GoogleConfig {
    /// Configuration with the public endpoints and default timeout.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_owned(),
            directions_url: DEFAULT_DIRECTIONS_URL.to_owned(),
            geocode_url: DEFAULT_GEOCODE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the Directions endpoint.
    #[must_use]
    pub fn with_directions_url(mut self, url: &str) -> Self {
        url.clone_into(&mut self.directions_url);
        self
    }

    /// Override the Geocoding endpoint.
    #[must_use]
    pub fn with_geocode_url(mut self, url: &str) -> Self {
        url.clone_into(&mut self.geocode_url);
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, crate::ProviderError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| crate::ProviderError::Config(format!("HTTP client setup failed: {e}")))
    }
}

// The key never appears in logs.
impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &"<redacted>")
            .field("directions_url", &self.directions_url)
            .field("geocode_url", &self.geocode_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
