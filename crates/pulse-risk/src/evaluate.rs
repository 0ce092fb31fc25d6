//! Whole-candidate evaluation: decode, aggregate, package as [`ScoredRoute`].
//!
//! Routes are evaluated concurrently and every route fans out its own
//! sample lookups, so one request issues all of its store queries at once.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use pulse_types::{RouteCandidate, ScoredRoute};

use crate::aggregate::{NearbyLookup, aggregate_risk_concurrent};
use crate::polyline::decode;

/// Decode one candidate and compute its aggregate risk.
///
/// Malformed geometry yields an empty coordinate list and zero risk.
pub async fn score_route<L: NearbyLookup>(
    candidate: RouteCandidate,
    radius_meters: f64,
    now: DateTime<Utc>,
    lookup: &L,
) -> ScoredRoute {
    let coordinates = decode(&candidate.encoded_path);
    let risk = aggregate_risk_concurrent(&coordinates, radius_meters, now, lookup).await;

    ScoredRoute {
        candidate,
        coordinates,
        aggregate_risk: risk.aggregate_risk,
        event_count: risk.event_count,
        samples: risk.samples,
        degraded_samples: risk.degraded_samples,
        normalized_distance: 0.0,
        normalized_risk: 0.0,
    }
}

/// Score every candidate concurrently, preserving input order.
pub async fn evaluate_routes<L: NearbyLookup>(
    candidates: Vec<RouteCandidate>,
    radius_meters: f64,
    now: DateTime<Utc>,
    lookup: &L,
) -> Vec<ScoredRoute> {
    let count = candidates.len();
    let scored = join_all(
        candidates
            .into_iter()
            .map(|candidate| score_route(candidate, radius_meters, now, lookup)),
    )
    .await;
    tracing::debug!(routes = count, radius_meters, "Evaluated route candidates");
    scored
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pulse_types::{Coordinate, EventId, EventType, Preference, SafetyEvent, Severity};

    use super::*;
    use crate::aggregate::Lookup;
    use crate::geodesy::distance_meters;
    use crate::polyline::encode;
    use crate::select::select_route;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// In-memory lookup filtering a fixed pool by true distance.
    struct Pool(Vec<SafetyEvent>);

    impl NearbyLookup for Pool {
        async fn nearby(&self, center: Coordinate, radius_meters: f64) -> Lookup {
            Lookup::Found(
                self.0
                    .iter()
                    .filter(|e| distance_meters(center, e.coordinates) <= radius_meters)
                    .cloned()
                    .collect(),
            )
        }
    }

    fn incident(at: Coordinate) -> SafetyEvent {
        SafetyEvent {
            id: EventId::new(),
            source: String::from("test"),
            title: String::from("Armed robbery"),
            text: String::new(),
            url: String::new(),
            timestamp: now(),
            coordinates: at,
            event_type: EventType::MajorCrime,
            severity: Severity::from_raw(Some(8)),
            urgency: 50,
            address_hint: None,
            notes: String::new(),
            safety_score: 0.0,
            created_at: now(),
        }
    }

    fn candidate(path: &[Coordinate], distance: f64, duration: f64) -> RouteCandidate {
        RouteCandidate {
            encoded_path: encode(path),
            distance_meters: distance,
            duration_seconds: duration,
        }
    }

    #[tokio::test]
    #[allow(clippy::indexing_slicing)]
    async fn risky_route_scores_higher_and_loses_safest() {
        let direct = [Coordinate::new(40.7500, -73.9900), Coordinate::new(40.7550, -73.9900)];
        let detour = [Coordinate::new(40.7500, -73.9950), Coordinate::new(40.7550, -73.9950)];
        let pool = Pool(vec![incident(Coordinate::new(40.7500, -73.9900))]);

        let scored = evaluate_routes(
            vec![candidate(&direct, 600.0, 120.0), candidate(&detour, 800.0, 150.0)],
            50.0,
            now(),
            &pool,
        )
        .await;

        assert_eq!(scored.len(), 2);
        let (first, second) = (&scored[0], &scored[1]);
        assert_eq!(first.coordinates.len(), 2);
        assert_eq!(first.event_count, 1);
        assert!(first.aggregate_risk > 0.0);
        assert!(second.aggregate_risk.abs() < f64::EPSILON);

        let fastest = select_route(scored.clone(), Preference::Fastest, 0.5, 0.5);
        assert_eq!(fastest.map(|r| r.distance_meters()).ok(), Some(600.0));

        let safest = select_route(scored, Preference::Safest, 0.2, 0.8);
        assert_eq!(safest.map(|r| r.distance_meters()).ok(), Some(800.0));
    }

    #[tokio::test]
    async fn malformed_geometry_degrades_to_zero_risk() {
        let pool = Pool(vec![incident(Coordinate::new(40.75, -73.99))]);
        let broken = RouteCandidate {
            encoded_path: String::from("_p~iF~ps|"),
            distance_meters: 100.0,
            duration_seconds: 10.0,
        };
        let scored = score_route(broken, 50.0, now(), &pool).await;
        assert!(scored.coordinates.is_empty());
        assert_eq!(scored.samples, 0);
        assert_eq!(scored.event_count, 0);
        assert!(scored.aggregate_risk.abs() < f64::EPSILON);
    }
}
