//! In-process event backend.
//!
//! Holds events in a vector behind a [`tokio::sync::RwLock`]. Filtering,
//! ordering and caps match [`crate::PgEventStore`] so either backend can sit
//! behind [`crate::EventStore`].

use std::sync::Arc;

use pulse_risk::distance_meters;
use pulse_types::{Coordinate, SafetyEvent};
use tokio::sync::RwLock;

use crate::store::{EventQuery, MAX_NEARBY_EVENTS};

/// Shared in-memory event list.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Arc<RwLock<Vec<SafetyEvent>>>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.
    pub async fn insert(&self, event: SafetyEvent) {
        self.events.write().await.push(event);
    }

    /// Append many events.
    pub async fn batch_insert(&self, events: &[SafetyEvent]) {
        self.events.write().await.extend_from_slice(events);
        tracing::debug!(count = events.len(), "Inserted events (memory)");
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Whether the store holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Events passing `query`, newest first.
    pub async fn query(&self, query: &EventQuery) -> Vec<SafetyEvent> {
        let events = self.events.read().await;
        let mut matched: Vec<SafetyEvent> = events
            .iter()
            .filter(|event| query.matches(event))
            .cloned()
            .collect();
        drop(events);
        newest_first(&mut matched);
        matched.truncate(query.effective_limit());
        matched
    }

    /// Events within `radius_meters` of `center`, newest first.
    pub async fn find_nearby(&self, center: Coordinate, radius_meters: f64) -> Vec<SafetyEvent> {
        let events = self.events.read().await;
        let mut matched: Vec<SafetyEvent> = events
            .iter()
            .filter(|event| distance_meters(center, event.coordinates) <= radius_meters)
            .cloned()
            .collect();
        drop(events);
        newest_first(&mut matched);
        matched.truncate(MAX_NEARBY_EVENTS);
        matched
    }
}

fn newest_first(events: &mut [SafetyEvent]) {
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use pulse_types::{BoundingBox, ClassifiedEvent};

    use super::*;

    fn event_at(lat: f64, lng: f64, hours_ago: i64) -> SafetyEvent {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let classified = ClassifiedEvent {
            published: now.checked_sub_signed(Duration::hours(hours_ago)),
            ..ClassifiedEvent::default()
        };
        SafetyEvent::from_classified(classified, Coordinate::new(lat, lng), 10.0, now)
    }

    #[tokio::test]
    async fn bbox_edges_are_inclusive() {
        let store = MemoryEventStore::new();
        store.insert(event_at(40.0, -74.0, 1)).await;
        store.insert(event_at(41.0, -73.0, 2)).await;
        store.insert(event_at(41.5, -73.0, 3)).await;

        let query = EventQuery {
            bbox: Some(BoundingBox::new(
                Coordinate::new(40.0, -74.0),
                Coordinate::new(41.0, -73.0),
            )),
            ..EventQuery::default()
        };
        assert_eq!(store.query(&query).await.len(), 2);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn limit_keeps_the_newest() {
        let store = MemoryEventStore::new();
        for hours in [5, 1, 3] {
            store.insert(event_at(40.0, -74.0, hours)).await;
        }
        let query = EventQuery {
            limit: Some(2),
            ..EventQuery::default()
        };
        let events = store.query(&query).await;
        assert_eq!(events.len(), 2);
        assert!(events.first().unwrap().timestamp > events.last().unwrap().timestamp);
    }

    #[tokio::test]
    async fn nearby_respects_radius() {
        let store = MemoryEventStore::new();
        // ~33 m and ~111 m north of the centre.
        store.insert(event_at(40.0003, -74.0, 1)).await;
        store.insert(event_at(40.001, -74.0, 1)).await;

        let center = Coordinate::new(40.0, -74.0);
        assert_eq!(store.find_nearby(center, 50.0).await.len(), 1);
        assert_eq!(store.find_nearby(center, 200.0).await.len(), 2);
        assert!(store.find_nearby(center, f64::NAN).await.is_empty());
    }

    #[tokio::test]
    async fn empty_store() {
        let store = MemoryEventStore::new();
        assert!(store.is_empty().await);
        assert!(store.query(&EventQuery::default()).await.is_empty());
    }
}
