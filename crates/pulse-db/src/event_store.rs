//! `safety_events` table operations.
//!
//! Rows are written once at ingestion and never updated. Radius lookups
//! narrow by a degree box in SQL (served by the `(lat, lng)` index) and
//! apply the exact haversine distance in Rust.

use pulse_risk::{distance_meters, search_boxes};
use pulse_types::{Coordinate, EventId, EventType, SafetyEvent, Severity};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::store::{EventQuery, MAX_NEARBY_EVENTS};

/// Default batch size for event inserts.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Upper bound on rows pulled by the radius prefilter before the exact check.
const PREFILTER_LIMIT: i64 = 4_000;

const SELECT_COLUMNS: &str = "id, source, title, body, url, occurred_at, lat, lng, event_type, \
                              severity, urgency, address_hint, notes, safety_score, created_at";

/// Operations on the `safety_events` table.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
    batch_size: usize,
}

impl PgEventStore {
    /// Create a new event store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size for inserts.
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Insert a single event.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, event: &SafetyEvent) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO safety_events (id, source, title, body, url, occurred_at, lat, lng, event_type, severity, urgency, address_hint, notes, safety_score, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(event.id.into_inner())
        .bind(&event.source)
        .bind(&event.title)
        .bind(&event.text)
        .bind(&event.url)
        .bind(event.timestamp)
        .bind(event.coordinates.lat)
        .bind(event.coordinates.lng)
        .bind(event.event_type.as_str())
        .bind(i16::from(event.severity.get()))
        .bind(urgency_to_db(event.urgency))
        .bind(event.address_hint.as_deref())
        .bind(&event.notes)
        .bind(event.safety_score)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %event.id, event_type = %event.event_type, "Inserted safety event");
        Ok(())
    }

    /// Batch-insert events.
    ///
    /// Each chunk of `batch_size` events is one `INSERT ... SELECT FROM
    /// UNNEST(...)` statement inside its own transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn batch_insert(&self, events: &[SafetyEvent]) -> Result<(), DbError> {
        if events.is_empty() {
            return Ok(());
        }

        for chunk in events.chunks(self.batch_size.max(1)) {
            let mut tx = self.pool.begin().await?;

            let len = chunk.len();
            let mut ids = Vec::with_capacity(len);
            let mut sources = Vec::with_capacity(len);
            let mut titles = Vec::with_capacity(len);
            let mut bodies = Vec::with_capacity(len);
            let mut urls = Vec::with_capacity(len);
            let mut occurred = Vec::with_capacity(len);
            let mut lats = Vec::with_capacity(len);
            let mut lngs = Vec::with_capacity(len);
            let mut event_types = Vec::with_capacity(len);
            let mut severities = Vec::with_capacity(len);
            let mut urgencies = Vec::with_capacity(len);
            let mut hints: Vec<Option<String>> = Vec::with_capacity(len);
            let mut notes = Vec::with_capacity(len);
            let mut scores = Vec::with_capacity(len);
            let mut created = Vec::with_capacity(len);

            for event in chunk {
                ids.push(event.id.into_inner());
                sources.push(event.source.clone());
                titles.push(event.title.clone());
                bodies.push(event.text.clone());
                urls.push(event.url.clone());
                occurred.push(event.timestamp);
                lats.push(event.coordinates.lat);
                lngs.push(event.coordinates.lng);
                event_types.push(event.event_type.as_str().to_owned());
                severities.push(i16::from(event.severity.get()));
                urgencies.push(urgency_to_db(event.urgency));
                hints.push(event.address_hint.clone());
                notes.push(event.notes.clone());
                scores.push(event.safety_score);
                created.push(event.created_at);
            }

            sqlx::query(
                r"INSERT INTO safety_events (id, source, title, body, url, occurred_at, lat, lng, event_type, severity, urgency, address_hint, notes, safety_score, created_at)
                  SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::TEXT[], $4::TEXT[], $5::TEXT[], $6::TIMESTAMPTZ[], $7::FLOAT8[], $8::FLOAT8[], $9::TEXT[], $10::SMALLINT[], $11::INTEGER[], $12::TEXT[], $13::TEXT[], $14::FLOAT8[], $15::TIMESTAMPTZ[])",
            )
            .bind(&ids)
            .bind(&sources)
            .bind(&titles)
            .bind(&bodies)
            .bind(&urls)
            .bind(&occurred)
            .bind(&lats)
            .bind(&lngs)
            .bind(&event_types)
            .bind(&severities)
            .bind(&urgencies)
            .bind(&hints)
            .bind(&notes)
            .bind(&scores)
            .bind(&created)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
        }

        tracing::debug!(count = events.len(), "Inserted safety events (batch UNNEST)");
        Ok(())
    }

    /// List events matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::InvalidRow`] if a stored row is malformed.
    pub async fn query(&self, query: &EventQuery) -> Result<Vec<SafetyEvent>, DbError> {
        let limit = i64::try_from(query.effective_limit()).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM safety_events
             WHERE ($1::FLOAT8 IS NULL OR (lat BETWEEN $1 AND $2 AND lng BETWEEN $3 AND $4))
               AND ($5::TIMESTAMPTZ IS NULL OR occurred_at >= $5)
             ORDER BY occurred_at DESC
             LIMIT $6"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(query.bbox.map(|b| b.sw.lat))
            .bind(query.bbox.map(|b| b.ne.lat))
            .bind(query.bbox.map(|b| b.sw.lng))
            .bind(query.bbox.map(|b| b.ne.lng))
            .bind(query.since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    /// Events within `radius_meters` of `center`, newest first, at most
    /// [`MAX_NEARBY_EVENTS`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::InvalidRow`] if a stored row is malformed.
    pub async fn find_nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<Vec<SafetyEvent>, DbError> {
        // One box, or two when the circle crosses the antimeridian. Both
        // share the latitude band.
        let boxes = search_boxes(center, radius_meters);
        let (Some(first), Some(last)) = (boxes.first(), boxes.last()) else {
            return Ok(Vec::new());
        };
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM safety_events
             WHERE lat BETWEEN $1 AND $2
               AND (lng BETWEEN $3 AND $4 OR lng BETWEEN $5 AND $6)
             ORDER BY occurred_at DESC
             LIMIT $7"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(first.sw.lat)
            .bind(first.ne.lat)
            .bind(first.sw.lng)
            .bind(first.ne.lng)
            .bind(last.sw.lng)
            .bind(last.ne.lng)
            .bind(PREFILTER_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        let mut events = Vec::new();
        for row in rows {
            let event = row.into_event()?;
            if distance_meters(center, event.coordinates) <= radius_meters {
                events.push(event);
                if events.len() >= MAX_NEARBY_EVENTS {
                    break;
                }
            }
        }
        Ok(events)
    }
}

/// A row from the `safety_events` table.
///
/// Uses runtime types rather than compile-time checked types to
/// avoid requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Event ID.
    pub id: Uuid,
    /// Source tag.
    pub source: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Link to the original item.
    pub url: String,
    /// When the event happened.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Category name.
    pub event_type: String,
    /// Severity 1--10.
    pub severity: i16,
    /// Urgency 0--100.
    pub urgency: i32,
    /// Geocoder hint.
    pub address_hint: Option<String>,
    /// Classifier notes.
    pub notes: String,
    /// Score at ingestion time.
    pub safety_score: f64,
    /// Insert time.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl EventRow {
    /// Convert the row back into a [`SafetyEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] for out-of-range coordinates or a
    /// negative urgency.
    pub fn into_event(self) -> Result<SafetyEvent, DbError> {
        let coordinates = Coordinate::new(self.lat, self.lng);
        if !coordinates.is_valid() {
            return Err(DbError::InvalidRow {
                id: self.id,
                reason: format!("coordinates out of range: ({}, {})", self.lat, self.lng),
            });
        }
        let urgency = u32::try_from(self.urgency).map_err(|e| DbError::InvalidRow {
            id: self.id,
            reason: format!("urgency {}: {e}", self.urgency),
        })?;

        Ok(SafetyEvent {
            id: EventId::from(self.id),
            source: self.source,
            title: self.title,
            text: self.body,
            url: self.url,
            timestamp: self.occurred_at,
            coordinates,
            event_type: EventType::from_name(&self.event_type),
            severity: Severity::from_raw(Some(i64::from(self.severity))),
            urgency,
            address_hint: self.address_hint,
            notes: self.notes,
            safety_score: self.safety_score,
            created_at: self.created_at,
        })
    }
}

fn urgency_to_db(urgency: u32) -> i32 {
    i32::try_from(urgency).unwrap_or(i32::MAX)
}
