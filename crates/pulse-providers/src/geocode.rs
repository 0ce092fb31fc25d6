//! Free-text place name to coordinates.
//!
//! Geocoding is best effort: every failure mode collapses into a
//! [`GeocodeOutcome`] so ingestion can fall through to the next hint.

use pulse_types::Coordinate;
use serde_json::Value;

use crate::config::GoogleConfig;
use crate::error::ProviderError;

/// Result of one geocoding attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    /// The query resolved to a point.
    Resolved(Coordinate),
    /// The service answered but knows no such place.
    NotFound,
    /// The service could not be asked or did not answer usefully.
    Unavailable(String),
}

impl GeocodeOutcome {
    /// The resolved point, if any.
    pub const fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Resolved(point) => Some(*point),
            Self::NotFound | Self::Unavailable(_) => None,
        }
    }
}

/// Place-name resolver.
#[derive(Debug, Clone)]
pub enum Geocoder {
    /// Google Geocoding API.
    Google(GeocodingClient),
    /// A fixed gazetteer matched case-insensitively on the whole name.
    Fixed(Vec<(String, Coordinate)>),
    /// Geocoding turned off; every lookup is unavailable.
    Disabled,
}

impl Geocoder {
    /// Resolve `query` to a coordinate. Blank queries are never sent.
    pub async fn geocode(&self, query: &str) -> GeocodeOutcome {
        let query = query.trim();
        if query.is_empty() {
            return GeocodeOutcome::NotFound;
        }
        let outcome = match self {
            Self::Google(client) => client.geocode(query).await,
            Self::Fixed(places) => places
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(query))
                .map_or(GeocodeOutcome::NotFound, |(_, point)| {
                    GeocodeOutcome::Resolved(*point)
                }),
            Self::Disabled => GeocodeOutcome::Unavailable("geocoding disabled".to_owned()),
        };
        if let GeocodeOutcome::Unavailable(reason) = &outcome {
            tracing::warn!(query, reason = %reason, geocoder = self.name(), "Geocoding unavailable");
        }
        outcome
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Google(_) => "google",
            Self::Fixed(_) => "fixed",
            Self::Disabled => "disabled",
        }
    }
}

/// Client for the Google Geocoding API.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeocodingClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the key is empty or the HTTP
    /// client cannot be built.
    pub fn new(config: &GoogleConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Config("empty Google Maps API key".to_owned()));
        }
        Ok(Self {
            client: config.http_client()?,
            url: config.geocode_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn geocode(&self, query: &str) -> GeocodeOutcome {
        let response = match self
            .client
            .get(&self.url)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return GeocodeOutcome::Unavailable(format!("request failed: {e}")),
        };

        let status = response.status();
        if !status.is_success() {
            return GeocodeOutcome::Unavailable(format!("Geocoding API returned {status}"));
        }

        match response.json::<Value>().await {
            Ok(json) => parse_geocode(&json),
            Err(e) => GeocodeOutcome::Unavailable(format!("response parse failed: {e}")),
        }
    }
}

/// Interpret a Geocoding API response body.
///
/// `OK` with a valid `results[0].geometry.location` resolves;
/// `ZERO_RESULTS` is not found; anything else is unavailable.
pub fn parse_geocode(json: &Value) -> GeocodeOutcome {
    let status = json.get("status").and_then(Value::as_str).unwrap_or("MISSING");
    match status {
        "OK" => {}
        "ZERO_RESULTS" => return GeocodeOutcome::NotFound,
        other => return GeocodeOutcome::Unavailable(format!("status {other}")),
    }

    let location = json
        .get("results")
        .and_then(|r| r.get(0))
        .and_then(|r| r.get("geometry"))
        .and_then(|g| g.get("location"));
    let lat = location.and_then(|l| l.get("lat")).and_then(Value::as_f64);
    let lng = location.and_then(|l| l.get("lng")).and_then(Value::as_f64);

    match (lat, lng) {
        (Some(lat), Some(lng)) if Coordinate::new(lat, lng).is_valid() => {
            GeocodeOutcome::Resolved(Coordinate::new(lat, lng))
        }
        (Some(_), Some(_)) => GeocodeOutcome::Unavailable("location out of range".to_owned()),
        _ => GeocodeOutcome::Unavailable("missing results[0].geometry.location".to_owned()),
    }
}
