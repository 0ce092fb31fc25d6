//! Route sampling and nearby-event risk aggregation.
//!
//! A route is reduced to at most a couple of dozen sample points. Each sample
//! asks the event store for events within the search radius; every event
//! inside the radius contributes its score weighted by a linear distance
//! falloff (1 at the sample point, 0 at the radius). The route's aggregate
//! risk is the total weighted risk divided by the number of samples.
//!
//! # Lookup contract
//!
//! The aggregator does not deduplicate across samples: an event near two
//! samples is counted (and weighted) twice. Callers that want a different
//! scale must deduplicate before the lookup returns. A lookup that fails
//! reports [`Lookup::Degraded`]; that sample contributes nothing but still
//! counts toward the average.

use std::future::Future;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use pulse_types::{Coordinate, SafetyEvent};

use crate::geodesy::distance_meters;
use crate::scorer::{MAX_SCORE, score};

/// Default search radius around each sample point, in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 50.0;

/// Routes with at most this many points are sampled at every point.
pub const DIRECT_SAMPLE_LIMIT: usize = 10;

/// Longer routes are strided down to roughly this many samples.
pub const TARGET_SAMPLES: usize = 20;

/// Outcome of one nearby-event lookup.
///
/// Keeps "no events here" distinct from "the store could not answer".
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The store answered; the list may be empty.
    Found(Vec<SafetyEvent>),
    /// The store failed or timed out; treated as no events for this sample.
    Degraded(String),
}

impl Lookup {
    /// Events returned by the lookup (empty when degraded).
    pub fn events(&self) -> &[SafetyEvent] {
        match self {
            Self::Found(events) => events,
            Self::Degraded(_) => &[],
        }
    }

    /// Whether the lookup failed.
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Source of events near a point, typically backed by the event store.
///
/// Implementations must return within bounded time and report failures as
/// [`Lookup::Degraded`] rather than erroring.
pub trait NearbyLookup {
    /// Events within `radius_meters` of `center`.
    fn nearby(&self, center: Coordinate, radius_meters: f64) -> impl Future<Output = Lookup> + Send;
}

/// Aggregate risk of one route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteRisk {
    /// Average weighted risk per sample point, in `[0, 100]`.
    pub aggregate_risk: f64,
    /// Number of (sample, event) pairs inside the radius.
    pub event_count: u32,
    /// Number of sample points evaluated.
    pub samples: u32,
    /// Samples whose lookup was degraded.
    pub degraded_samples: u32,
}

/// Pick the representative sample points of a route.
///
/// Up to [`DIRECT_SAMPLE_LIMIT`] points are used as-is; longer routes take
/// every `len / TARGET_SAMPLES`-th point starting with the first.
pub fn sample_points(route: &[Coordinate]) -> Vec<Coordinate> {
    if route.len() <= DIRECT_SAMPLE_LIMIT {
        return route.to_vec();
    }
    let stride = (route.len() / TARGET_SAMPLES).max(1);
    route.iter().step_by(stride).copied().collect()
}

/// Aggregate route risk with a synchronous lookup, one sample at a time.
///
/// An empty route returns [`RouteRisk::default`] without calling `lookup`.
pub fn aggregate_risk<F>(
    route: &[Coordinate],
    radius_meters: f64,
    now: DateTime<Utc>,
    mut lookup: F,
) -> RouteRisk
where
    F: FnMut(Coordinate, f64) -> Lookup,
{
    let samples = sample_points(route);
    let contributions = samples.iter().map(|&point| {
        let found = lookup(point, radius_meters);
        SampleContribution::measure(point, radius_meters, now, &found)
    });
    reduce(contributions, samples.len())
}

/// Aggregate route risk, issuing every sample lookup concurrently.
///
/// Lookups are independent; results are gathered before the reduction so
/// the outcome is identical to [`aggregate_risk`] over the same answers.
pub async fn aggregate_risk_concurrent<L: NearbyLookup>(
    route: &[Coordinate],
    radius_meters: f64,
    now: DateTime<Utc>,
    lookup: &L,
) -> RouteRisk {
    let samples = sample_points(route);
    if samples.is_empty() {
        return RouteRisk::default();
    }

    let answers = join_all(samples.iter().map(|&point| lookup.nearby(point, radius_meters))).await;

    let contributions = samples
        .iter()
        .zip(&answers)
        .map(|(&point, found)| SampleContribution::measure(point, radius_meters, now, found));
    reduce(contributions, samples.len())
}

/// Partial result for one sample point.
#[derive(Debug, Clone, Copy, Default)]
struct SampleContribution {
    weighted_risk: f64,
    events: u32,
    degraded: bool,
}

impl SampleContribution {
    fn measure(point: Coordinate, radius_meters: f64, now: DateTime<Utc>, found: &Lookup) -> Self {
        let mut contribution = Self {
            degraded: found.is_degraded(),
            ..Self::default()
        };
        if !(radius_meters.is_finite() && radius_meters > 0.0) {
            return contribution;
        }

        for event in found.events() {
            let distance = distance_meters(point, event.coordinates);
            if distance > radius_meters {
                continue;
            }
            let weight = 1.0 - distance / radius_meters;
            contribution.weighted_risk = weight.mul_add(score(event, now), contribution.weighted_risk);
            contribution.events = contribution.events.saturating_add(1);
        }
        contribution
    }
}

fn reduce(contributions: impl Iterator<Item = SampleContribution>, sample_count: usize) -> RouteRisk {
    if sample_count == 0 {
        return RouteRisk::default();
    }

    let mut total = 0.0;
    let mut risk = RouteRisk {
        samples: u32::try_from(sample_count).unwrap_or(u32::MAX),
        ..RouteRisk::default()
    };
    for part in contributions {
        total += part.weighted_risk;
        risk.event_count = risk.event_count.saturating_add(part.events);
        if part.degraded {
            risk.degraded_samples = risk.degraded_samples.saturating_add(1);
        }
    }

    risk.aggregate_risk = (total / f64::from(risk.samples)).clamp(0.0, MAX_SCORE);
    if risk.degraded_samples > 0 {
        tracing::debug!(
            samples = risk.samples,
            degraded = risk.degraded_samples,
            "Route risk computed with degraded samples"
        );
    }
    risk
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeZone;
    use pulse_types::{EventId, EventType, Severity};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// Event scored exactly `severity * 10` at `now` (no keywords, age zero).
    fn event_at(point: Coordinate, severity: i64) -> SafetyEvent {
        SafetyEvent {
            id: EventId::new(),
            source: String::from("test"),
            title: String::from("Report"),
            text: String::new(),
            url: String::new(),
            timestamp: now(),
            coordinates: point,
            event_type: EventType::Other,
            severity: Severity::from_raw(Some(severity)),
            urgency: 0,
            address_hint: None,
            notes: String::new(),
            safety_score: 0.0,
            created_at: now(),
        }
    }

    /// Move `meters` north of `point`.
    fn north_of(point: Coordinate, meters: f64) -> Coordinate {
        let degrees = meters / (crate::geodesy::EARTH_RADIUS_METERS * core::f64::consts::PI / 180.0);
        Coordinate::new(point.lat + degrees, point.lng)
    }

    fn line(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| {
                let step = f64::from(u32::try_from(i).unwrap_or(0));
                Coordinate::new(40.0 + step * 0.01, -74.0)
            })
            .collect()
    }

    /// Answers every lookup with the same pool of events.
    struct StaticPool(Vec<SafetyEvent>);

    impl NearbyLookup for StaticPool {
        async fn nearby(&self, _center: Coordinate, _radius_meters: f64) -> Lookup {
            tokio::task::yield_now().await;
            Lookup::Found(self.0.clone())
        }
    }

    #[test]
    fn empty_route_performs_no_lookups() {
        let calls = AtomicUsize::new(0);
        let risk = aggregate_risk(&[], DEFAULT_RADIUS_METERS, now(), |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Lookup::Found(Vec::new())
        });
        assert_eq!(risk, RouteRisk::default());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn short_routes_use_every_point() {
        assert_eq!(sample_points(&line(1)).len(), 1);
        assert_eq!(sample_points(&line(10)).len(), 10);
    }

    #[test]
    fn long_routes_are_strided() {
        // 100 / 20 = stride 5 -> 20 samples.
        let route = line(100);
        let samples = sample_points(&route);
        assert_eq!(samples.len(), 20);
        assert_eq!(samples.first(), route.first());
        assert_eq!(samples.get(1), route.get(5));

        // 45 / 20 = stride 2 -> 23 samples.
        assert_eq!(sample_points(&line(45)).len(), 23);
        // 11..39 points keep stride 1.
        assert_eq!(sample_points(&line(11)).len(), 11);
    }

    #[test]
    fn event_on_sample_point_contributes_full_score() {
        let point = Coordinate::new(40.0, -74.0);
        let pool = vec![event_at(point, 6)];
        let risk = aggregate_risk(&[point], DEFAULT_RADIUS_METERS, now(), |_, _| {
            Lookup::Found(pool.clone())
        });
        assert!((risk.aggregate_risk - 60.0).abs() < 1e-9);
        assert_eq!(risk.event_count, 1);
        assert_eq!(risk.samples, 1);
    }

    #[test]
    fn weight_falls_off_linearly() {
        let point = Coordinate::new(40.0, -74.0);
        let near = north_of(point, 25.0);
        let d = distance_meters(point, near);
        let pool = vec![event_at(near, 10)];
        let risk = aggregate_risk(&[point], 50.0, now(), |_, _| Lookup::Found(pool.clone()));
        let expected = (1.0 - d / 50.0) * 100.0;
        assert!((risk.aggregate_risk - expected).abs() < 1e-9);
        assert!((risk.aggregate_risk - 50.0).abs() < 0.1);
    }

    #[test]
    fn events_beyond_radius_are_ignored() {
        let point = Coordinate::new(40.0, -74.0);
        let pool = vec![event_at(north_of(point, 80.0), 10)];
        let risk = aggregate_risk(&[point], 50.0, now(), |_, _| Lookup::Found(pool.clone()));
        assert!(risk.aggregate_risk.abs() < f64::EPSILON);
        assert_eq!(risk.event_count, 0);
    }

    #[test]
    fn average_is_per_sample_not_per_event() {
        let a = Coordinate::new(40.0, -74.0);
        let b = Coordinate::new(40.01, -74.0);
        let pool = vec![event_at(a, 8)];
        let risk = aggregate_risk(&[a, b], 50.0, now(), |_, _| Lookup::Found(pool.clone()));
        assert!((risk.aggregate_risk - 40.0).abs() < 1e-9);
        assert_eq!(risk.samples, 2);
        assert_eq!(risk.event_count, 1);
    }

    #[test]
    fn event_near_two_samples_is_counted_twice() {
        let a = Coordinate::new(40.0, -74.0);
        let b = north_of(a, 10.0);
        let shared = north_of(a, 5.0);
        let pool = vec![event_at(shared, 10)];
        let risk = aggregate_risk(&[a, b], 50.0, now(), |_, _| Lookup::Found(pool.clone()));
        assert_eq!(risk.event_count, 2);
        // Both samples see the event at ~5 m: weight ~0.9 each.
        assert!((risk.aggregate_risk - 90.0).abs() < 0.1);
    }

    #[test]
    fn degraded_sample_counts_as_empty() {
        let a = Coordinate::new(40.0, -74.0);
        let b = Coordinate::new(40.01, -74.0);
        let pool = vec![event_at(a, 10)];
        let risk = aggregate_risk(&[a, b], 50.0, now(), |p, _| {
            if (p.lat - a.lat).abs() < 1e-12 {
                Lookup::Found(pool.clone())
            } else {
                Lookup::Degraded(String::from("timeout"))
            }
        });
        assert_eq!(risk.degraded_samples, 1);
        assert_eq!(risk.samples, 2);
        assert!((risk.aggregate_risk - 50.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_is_clamped_to_max_score() {
        let point = Coordinate::new(40.0, -74.0);
        let pool: Vec<_> = (0..5).map(|_| event_at(point, 10)).collect();
        let risk = aggregate_risk(&[point], 50.0, now(), |_, _| Lookup::Found(pool.clone()));
        assert_eq!(risk.event_count, 5);
        assert!((risk.aggregate_risk - MAX_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn non_positive_radius_matches_nothing() {
        let point = Coordinate::new(40.0, -74.0);
        let pool = vec![event_at(point, 10)];
        for radius in [0.0, -10.0, f64::NAN] {
            let risk = aggregate_risk(&[point], radius, now(), |_, _| Lookup::Found(pool.clone()));
            assert_eq!(risk.event_count, 0);
            assert!(risk.aggregate_risk.abs() < f64::EPSILON);
        }
    }

    #[tokio::test]
    async fn concurrent_matches_sequential() {
        let route = line(60);
        let pool: Vec<_> = route
            .iter()
            .step_by(7)
            .map(|&p| event_at(north_of(p, 12.0), 7))
            .collect();

        let sequential =
            aggregate_risk(&route, 50.0, now(), |_, _| Lookup::Found(pool.clone()));
        let concurrent =
            aggregate_risk_concurrent(&route, 50.0, now(), &StaticPool(pool.clone())).await;

        assert_eq!(sequential.event_count, concurrent.event_count);
        assert_eq!(sequential.samples, concurrent.samples);
        assert!((sequential.aggregate_risk - concurrent.aggregate_risk).abs() < 1e-9);
        assert!(concurrent.event_count > 0);
    }

    #[tokio::test]
    async fn concurrent_empty_route_is_zero() {
        let risk = aggregate_risk_concurrent(&[], 50.0, now(), &StaticPool(Vec::new())).await;
        assert_eq!(risk, RouteRisk::default());
    }
}
