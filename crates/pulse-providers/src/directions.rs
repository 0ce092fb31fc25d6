//! Candidate routes from a directions service.
//!
//! [`RouteProvider`] is the only thing route scoring sees. The Google variant
//! calls the Directions API with `alternatives=true` and keeps, per route,
//! the first leg's distance and duration and the overview polyline.

use pulse_types::{Coordinate, RouteCandidate, TravelMode};
use serde_json::Value;

use crate::config::GoogleConfig;
use crate::error::ProviderError;

/// An origin/destination request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    /// Start of the trip.
    pub origin: Coordinate,
    /// End of the trip.
    pub destination: Coordinate,
    /// Travel mode passed through to the service.
    pub mode: TravelMode,
}

/// Source of candidate routes.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
#[derive(Debug, Clone)]
pub enum RouteProvider {
    /// Google Directions API.
    Google(DirectionsClient),
    /// The same candidates for every query (offline and demo use).
    Fixed(Vec<RouteCandidate>),
    /// No directions service configured.
    Disabled,
}

impl RouteProvider {
    /// Candidate routes for `query`, in provider order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NoRoutes`] when there is nothing to choose
    /// from, [`ProviderError::Config`] when disabled, and the client's
    /// errors for the Google variant.
    pub async fn routes(&self, query: &RouteQuery) -> Result<Vec<RouteCandidate>, ProviderError> {
        match self {
            Self::Google(client) => client.routes(query).await,
            Self::Fixed(candidates) if candidates.is_empty() => Err(ProviderError::NoRoutes),
            Self::Fixed(candidates) => Ok(candidates.clone()),
            Self::Disabled => Err(ProviderError::Config(
                "GOOGLE_MAPS_API_KEY not configured".to_owned(),
            )),
        }
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

/// Client for the Google Directions API.
#[derive(Debug, Clone)]
pub struct DirectionsClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl DirectionsClient {
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
            url: config.directions_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn routes(&self, query: &RouteQuery) -> Result<Vec<RouteCandidate>, ProviderError> {
        let origin = format!("{},{}", query.origin.lat, query.origin.lng);
        let destination = format!("{},{}", query.destination.lat, query.destination.lng);

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", query.mode.as_str()),
                ("alternatives", "true"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Http(format!("Directions request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http(format!("Directions API returned {status}")));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Directions response parse failed: {e}")))?;

        let candidates = parse_directions(&json)?;
        tracing::debug!(
            mode = query.mode.as_str(),
            candidates = candidates.len(),
            "Fetched route candidates"
        );
        Ok(candidates)
    }
}

/// Extract route candidates from a Directions API response body.
///
/// Routes missing a first leg, a distance, a duration or a polyline are
/// skipped.
///
/// # Errors
///
/// [`ProviderError::NoRoutes`] for `ZERO_RESULTS`/`NOT_FOUND` or an empty
/// route list, [`ProviderError::Status`] for any other non-`OK` status, and
/// [`ProviderError::Parse`] when no route is usable.
pub fn parse_directions(json: &Value) -> Result<Vec<RouteCandidate>, ProviderError> {
    let status = json.get("status").and_then(Value::as_str).unwrap_or("MISSING");
    match status {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Err(ProviderError::NoRoutes),
        other => return Err(ProviderError::Status(other.to_owned())),
    }

    let routes = json
        .get("routes")
        .and_then(Value::as_array)
        .filter(|routes| !routes.is_empty())
        .ok_or(ProviderError::NoRoutes)?;

    let candidates: Vec<RouteCandidate> = routes
        .iter()
        .enumerate()
        .filter_map(|(index, route)| {
            let candidate = parse_route(route);
            if candidate.is_none() {
                tracing::warn!(index, "Skipping malformed directions route");
            }
            candidate
        })
        .collect();

    if candidates.is_empty() {
        return Err(ProviderError::Parse(
            "no route had legs[0].distance, legs[0].duration and overview_polyline".to_owned(),
        ));
    }
    Ok(candidates)
}

fn parse_route(route: &Value) -> Option<RouteCandidate> {
    let leg = route.get("legs")?.get(0)?;
    let distance_meters = leg.get("distance")?.get("value")?.as_f64()?;
    let duration_seconds = leg.get("duration")?.get("value")?.as_f64()?;
    let encoded_path = route
        .get("overview_polyline")?
        .get("points")?
        .as_str()?
        .to_owned();

    Some(RouteCandidate {
        encoded_path,
        distance_meters,
        duration_seconds,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn route(distance: u64, duration: u64, points: &str) -> Value {
        json!({
            "legs": [{
                "distance": {"text": "", "value": distance},
                "duration": {"text": "", "value": duration}
            }],
            "overview_polyline": {"points": points},
            "summary": "Broadway"
        })
    }

    #[test]
    fn parses_alternatives_in_order() {
        let body = json!({
            "status": "OK",
            "routes": [route(1200, 300, "abc"), route(900, 420, "def")]
        });
        let candidates = parse_directions(&body).unwrap_or_default();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates.first().map(|c| c.encoded_path.as_str()), Some("abc"));
        let last = candidates.last().map_or(0.0, |c| c.distance_meters);
        assert!((last - 900.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_results_means_no_routes() {
        let body = json!({"status": "ZERO_RESULTS", "routes": []});
        assert!(matches!(parse_directions(&body), Err(ProviderError::NoRoutes)));
        let empty = json!({"status": "OK", "routes": []});
        assert!(matches!(parse_directions(&empty), Err(ProviderError::NoRoutes)));
    }

    #[test]
    fn other_statuses_are_reported() {
        let body = json!({"status": "REQUEST_DENIED", "error_message": "bad key"});
        assert!(matches!(
            parse_directions(&body),
            Err(ProviderError::Status(status)) if status == "REQUEST_DENIED"
        ));
    }

    #[test]
    fn malformed_routes_are_skipped() {
        let body = json!({
            "status": "OK",
            "routes": [{"legs": []}, route(500, 60, "ghi")]
        });
        let candidates = parse_directions(&body).unwrap_or_default();
        assert_eq!(candidates.len(), 1);

        let all_bad = json!({"status": "OK", "routes": [{"legs": []}]});
        assert!(matches!(parse_directions(&all_bad), Err(ProviderError::Parse(_))));
    }

    #[tokio::test]
    async fn fixed_and_disabled_providers() {
        let query = RouteQuery {
            origin: Coordinate::new(40.7580, -73.9857),
            destination: Coordinate::new(40.7128, -74.0060),
            mode: TravelMode::Walking,
        };
        let candidate = RouteCandidate {
            encoded_path: "abc".to_owned(),
            distance_meters: 10.0,
            duration_seconds: 5.0,
        };
        let fixed = RouteProvider::Fixed(vec![candidate.clone()]);
        assert_eq!(fixed.routes(&query).await.unwrap_or_default(), vec![candidate]);
        assert!(matches!(
            RouteProvider::Fixed(Vec::new()).routes(&query).await,
            Err(ProviderError::NoRoutes)
        ));
        assert!(matches!(
            RouteProvider::Disabled.routes(&query).await,
            Err(ProviderError::Config(_))
        ));
    }

    #[test]
    fn client_requires_a_key() {
        assert!(DirectionsClient::new(&GoogleConfig::new("  ")).is_err());
        let client = DirectionsClient::new(&GoogleConfig::new("key"));
        assert!(client.is_ok());
        assert_eq!(client.map(RouteProvider::Google).map(|p| p.name()).ok(), Some("google"));
    }
}
