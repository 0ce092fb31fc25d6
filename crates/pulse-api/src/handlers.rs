//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness and configured backends |
//! | `GET` | `/api/events` | Events in a viewport and time window |
//! | `POST` | `/api/events` | Ingest one classified event |
//! | `POST` | `/api/route` | Risk-aware route selection |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Duration, Utc};
use pulse_db::EventQuery;
use pulse_providers::RouteQuery;
use pulse_risk::{evaluate_routes, normalize, select_index};
use pulse_types::{
    BoundingBox, ClassifiedEvent, Coordinate, Preference, SafetyEvent, ScoredRoute, TravelMode,
};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

/// Characters of event text returned by the listing endpoint.
const LISTING_TEXT_CHARS: usize = 200;

/// Characters of the title used as the geocoding fallback.
const TITLE_GEOCODE_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/events`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct EventsQuery {
    /// South-west latitude.
    pub sw_lat: Option<f64>,
    /// South-west longitude.
    pub sw_lng: Option<f64>,
    /// North-east latitude.
    pub ne_lat: Option<f64>,
    /// North-east longitude.
    pub ne_lng: Option<f64>,
    /// Look-back window in hours; `0` disables the time filter.
    pub since_hours: Option<i64>,
    /// Maximum number of events.
    pub limit: Option<usize>,
}

/// Body of `POST /api/route`.
#[derive(Debug, serde::Deserialize)]
pub struct RouteRequest {
    /// Trip origin.
    pub start: Coordinate,
    /// Trip destination.
    pub end: Coordinate,
    /// Travel mode (default `driving`).
    #[serde(default)]
    pub mode: TravelMode,
    /// Weight of distance in the `safest` blend.
    #[serde(default = "default_weight")]
    pub alpha: f64,
    /// Weight of risk in the `safest` blend.
    #[serde(default = "default_weight")]
    pub beta: f64,
    /// Selection policy (default `safest`).
    #[serde(default)]
    pub preference: Preference,
}

const fn default_weight() -> f64 {
    0.5
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": state.clock.now(),
        "store": state.store.backend_name(),
        "route_provider": state.routes.name(),
        "geocoder": state.geocoder.name(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

/// List events newest first.
///
/// The bounding box applies only when all four corners are given.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let now = state.clock.now();
    let query = EventQuery {
        bbox: viewport(&params)?,
        since: since(now, params.since_hours.unwrap_or(state.risk.default_since_hours))?,
        limit: params.limit,
    };

    let events = state.store.query(&query).await?;
    let events: Vec<Value> = events.iter().map(event_summary).collect();

    tracing::debug!(count = events.len(), bbox = query.bbox.is_some(), "Listed events");

    Ok(Json(json!({
        "count": events.len(),
        "events": events,
    })))
}

fn viewport(params: &EventsQuery) -> Result<Option<BoundingBox>, ApiError> {
    let (Some(sw_lat), Some(sw_lng), Some(ne_lat), Some(ne_lng)) =
        (params.sw_lat, params.sw_lng, params.ne_lat, params.ne_lng)
    else {
        return Ok(None);
    };
    let sw = Coordinate::new(sw_lat, sw_lng);
    let ne = Coordinate::new(ne_lat, ne_lng);
    if !sw.is_valid() || !ne.is_valid() {
        return Err(ApiError::InvalidRequest("bounding box out of range".to_owned()));
    }
    if sw.lat > ne.lat || sw.lng > ne.lng {
        return Err(ApiError::InvalidRequest(
            "bounding box south-west corner must not exceed north-east corner".to_owned(),
        ));
    }
    Ok(Some(BoundingBox::new(sw, ne)))
}

fn since(now: DateTime<Utc>, hours: i64) -> Result<Option<DateTime<Utc>>, ApiError> {
    match hours {
        0 => Ok(None),
        h if h < 0 => Err(ApiError::InvalidRequest(format!("since_hours must be >= 0, got {h}"))),
        h => Duration::try_hours(h)
            .and_then(|window| now.checked_sub_signed(window))
            .map(Some)
            .ok_or_else(|| {
                ApiError::InvalidRequest(format!("since_hours is out of range, got {h}"))
            }),
    }
}

fn event_summary(event: &SafetyEvent) -> Value {
    let text: String = event.text.chars().take(LISTING_TEXT_CHARS).collect();
    json!({
        "id": event.id,
        "source": event.source,
        "title": event.title,
        "text": text,
        "url": event.url,
        "timestamp": event.timestamp,
        "coordinates": event.coordinates,
        "safety_score": event.safety_score,
        "event_type": event.event_type,
        "severity": event.severity,
    })
}

// ---------------------------------------------------------------------------
// POST /api/events
// ---------------------------------------------------------------------------

/// Locate, score and store one classified event.
///
/// Coordinates come from the payload when present; otherwise the address
/// hint and then the start of the title are geocoded. An event that cannot
/// be placed is rejected with 422.
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Json(classified): Json<ClassifiedEvent>,
) -> Result<impl IntoResponse, ApiError> {
    let now = state.clock.now();
    let coordinates = locate(&state, &classified).await?;

    let safety_score = pulse_risk::score(&classified, now);
    let event = SafetyEvent::from_classified(classified, coordinates, safety_score, now);
    state.store.insert(&event).await?;

    tracing::info!(
        id = %event.id,
        event_type = %event.event_type,
        severity = event.severity.get(),
        safety_score = event.safety_score,
        "Ingested event"
    );

    Ok((StatusCode::CREATED, Json(event)))
}

async fn locate(state: &AppState, classified: &ClassifiedEvent) -> Result<Coordinate, ApiError> {
    if let Some(point) = classified.coordinates {
        if point.is_valid() {
            return Ok(point);
        }
        return Err(ApiError::Unprocessable(format!(
            "coordinates out of range: ({}, {})",
            point.lat, point.lng
        )));
    }

    if let Some(hint) = classified.address_hint.as_deref()
        && let Some(point) = state.geocoder.geocode(hint).await.coordinate()
    {
        return Ok(point);
    }

    let title_prefix: String = classified.title.chars().take(TITLE_GEOCODE_CHARS).collect();
    if let Some(point) = state.geocoder.geocode(&title_prefix).await.coordinate() {
        return Ok(point);
    }

    tracing::debug!(title = %classified.title, "Event could not be located");
    Err(ApiError::Unprocessable(
        "event has no coordinates and could not be geocoded".to_owned(),
    ))
}

// ---------------------------------------------------------------------------
// POST /api/route
// ---------------------------------------------------------------------------

/// Fetch candidate routes, score them against nearby events and return the
/// one matching the request's preference.
pub async fn plan_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !request.start.is_valid() || !request.end.is_valid() {
        return Err(ApiError::InvalidRequest("start or end out of range".to_owned()));
    }
    let now = state.clock.now();

    let query = RouteQuery {
        origin: request.start,
        destination: request.end,
        mode: request.mode,
    };
    let candidates = state.routes.routes(&query).await?;
    let scored = evaluate_routes(candidates, state.risk.radius_meters, now, &state.store).await;
    let normalized = normalize(scored);
    let index = select_index(&normalized, request.preference, request.alpha, request.beta)?;

    let mut selected = None;
    let mut alternatives = Vec::new();
    for (i, route) in normalized.into_iter().enumerate() {
        if i == index {
            selected = Some(route);
        } else {
            alternatives.push(alternative_summary(&route));
        }
    }
    let selected = selected.ok_or(pulse_risk::RiskError::NoCandidates)?;

    tracing::info!(
        mode = request.mode.as_str(),
        preference = request.preference.as_str(),
        candidates = alternatives.len().saturating_add(1),
        aggregate_risk = selected.aggregate_risk,
        event_count = selected.event_count,
        degraded_samples = selected.degraded_samples,
        "Route planned"
    );

    Ok(Json(json!({
        "distance_meters": selected.distance_meters(),
        "duration_seconds": selected.duration_seconds(),
        "aggregate_risk": selected.aggregate_risk,
        "event_count": selected.event_count,
        "preference": request.preference,
        "polyline": selected.candidate.encoded_path,
        "alternatives": alternatives,
        "route": selected,
    })))
}

fn alternative_summary(route: &ScoredRoute) -> Value {
    json!({
        "polyline": route.candidate.encoded_path,
        "distance_meters": route.distance_meters(),
        "duration_seconds": route.duration_seconds(),
        "aggregate_risk": route.aggregate_risk,
        "event_count": route.event_count,
        "normalized_distance": route.normalized_distance,
        "normalized_risk": route.normalized_risk,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn partial_viewport_is_ignored() {
        let params = EventsQuery {
            sw_lat: Some(40.0),
            sw_lng: Some(-74.0),
            ne_lat: Some(41.0),
            ..EventsQuery::default()
        };
        assert!(matches!(viewport(&params), Ok(None)));
    }

    #[test]
    fn inverted_viewport_is_rejected() {
        let params = EventsQuery {
            sw_lat: Some(41.0),
            sw_lng: Some(-74.0),
            ne_lat: Some(40.0),
            ne_lng: Some(-73.0),
            ..EventsQuery::default()
        };
        assert!(matches!(viewport(&params), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn since_window() {
        let now = Utc
            .with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .unwrap_or_default();
        assert!(matches!(since(now, 0), Ok(None)));
        assert!(since(now, -1).is_err());
        let window = since(now, 24).ok().flatten();
        assert_eq!(window, now.checked_sub_signed(Duration::hours(24)));
    }

    #[test]
    fn since_window_past_the_calendar_is_rejected() {
        let now = Utc
            .with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .unwrap_or_default();
        // Beyond what chrono can represent as a duration.
        assert!(matches!(since(now, i64::MAX), Err(ApiError::InvalidRequest(_))));
        // A valid duration that still lands before the earliest date.
        assert!(matches!(since(now, 3_000_000_000), Err(ApiError::InvalidRequest(_))));
        // Ten years back is fine.
        assert!(matches!(since(now, 87_600), Ok(Some(_))));
    }

    #[test]
    fn listing_truncates_text_on_char_boundaries() {
        let classified = ClassifiedEvent {
            text: "é".repeat(300),
            ..ClassifiedEvent::default()
        };
        let event = SafetyEvent::from_classified(classified, Coordinate::new(0.0, 0.0), 0.0, Utc::now());
        let summary = event_summary(&event);
        let text = summary.get("text").and_then(Value::as_str).unwrap_or_default();
        assert_eq!(text.chars().count(), LISTING_TEXT_CHARS);
    }
}
