//! Safety events: the classified ingestion payload and the stored record.
//!
//! Events move through a short pipeline of pure transformations. The event
//! source and classifier produce a [`ClassifiedEvent`]; ingestion resolves
//! coordinates, scores it and turns it into an immutable [`SafetyEvent`].
//! Nothing downstream mutates an event.
//!
//! Deserialization of classifier output is lenient: a bad severity or
//! urgency, or an unparseable timestamp, degrades to the documented default
//! instead of rejecting the whole event.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::enums::EventType;
use crate::geo::Coordinate;
use crate::ids::EventId;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Intrinsic harmfulness of an event on a 1--10 scale.
///
/// Always inside `1..=10`. Out-of-range input is clamped; missing or
/// non-numeric input becomes [`Severity::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Severity(u8);

impl Severity {
    /// Lowest severity.
    pub const MIN: Self = Self(1);
    /// Highest severity.
    pub const MAX: Self = Self(10);
    /// Severity used when the classifier supplied nothing usable.
    pub const DEFAULT: Self = Self(5);

    /// Build a severity from an optional raw classifier value.
    pub fn from_raw(raw: Option<i64>) -> Self {
        raw.map_or(Self::DEFAULT, |value| {
            let clamped = value.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
            u8::try_from(clamped).map_or(Self::DEFAULT, Self)
        })
    }

    /// The severity as an integer in `1..=10`.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(Self::from_raw(value.as_ref().and_then(severity_from_value)))
    }
}

/// Extract an integer severity from an arbitrary JSON value.
///
/// Integers pass through, floats and numeric strings are rounded, anything
/// else (booleans, objects, `NaN` strings) yields `None`.
pub fn severity_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(round_to_i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(round_to_i64),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_i64(value: f64) -> Option<i64> {
    // Clamped well inside i64 before the cast; the exact magnitude is irrelevant
    // once Severity::from_raw clamps to 1..=10.
    value
        .is_finite()
        .then(|| value.round().clamp(-1_000_000.0, 1_000_000.0) as i64)
}

/// Highest classifier urgency.
pub const MAX_URGENCY: u32 = 100;

/// Extract an urgency in `0..=100` from an arbitrary JSON value.
///
/// Accepts the same shapes as [`severity_from_value`] and clamps into range.
/// Anything unusable becomes 0.
pub fn urgency_from_value(value: &Value) -> u32 {
    severity_from_value(value)
        .map(|raw| raw.clamp(0, i64::from(MAX_URGENCY)))
        .and_then(|raw| u32::try_from(raw).ok())
        .unwrap_or(0)
}

fn lenient_urgency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0, urgency_from_value))
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse a timestamp from classifier or feed output.
///
/// Accepts RFC 3339 (`2026-03-01T10:00:00Z`), naive ISO-8601 with `T` or a
/// space separator (interpreted as UTC), and integer Unix seconds.
pub fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(timestamp_from_value))
}

// ---------------------------------------------------------------------------
// ClassifiedEvent
// ---------------------------------------------------------------------------

/// An event as produced by the event source and classifier, before storage.
///
/// Coordinates are optional: when absent, ingestion geocodes the address
/// hint (or the title) before the event can be stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClassifiedEvent {
    /// Where the text came from (e.g. `rss:https://...`).
    #[serde(default)]
    pub source: String,
    /// Headline or post title.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub text: String,
    /// Link to the original item.
    #[serde(default)]
    pub url: String,
    /// Publication time, `None` when missing or unparseable.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published: Option<DateTime<Utc>>,
    /// Resolved location, if the source or classifier already had one.
    #[serde(default)]
    pub coordinates: Option<Coordinate>,
    /// Classifier category.
    #[serde(default)]
    pub event_type: EventType,
    /// Classifier severity.
    #[serde(default)]
    pub severity: Severity,
    /// Classifier urgency (0--100), 0 when missing or unusable.
    #[serde(default, deserialize_with = "lenient_urgency")]
    pub urgency: u32,
    /// Free-text location hint for the geocoder.
    #[serde(default)]
    pub address_hint: Option<String>,
    /// Classifier notes.
    #[serde(default)]
    pub notes: String,
}

// ---------------------------------------------------------------------------
// SafetyEvent
// ---------------------------------------------------------------------------

/// A located, scored event as held by the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SafetyEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// Where the text came from.
    pub source: String,
    /// Headline or post title.
    pub title: String,
    /// Body text.
    pub text: String,
    /// Link to the original item.
    pub url: String,
    /// When the event happened (publication time, or ingestion time if unknown).
    pub timestamp: DateTime<Utc>,
    /// Event location.
    pub coordinates: Coordinate,
    /// Classifier category.
    pub event_type: EventType,
    /// Classifier severity.
    pub severity: Severity,
    /// Classifier urgency (0--100).
    pub urgency: u32,
    /// Free-text location hint used for geocoding.
    pub address_hint: Option<String>,
    /// Classifier notes.
    pub notes: String,
    /// Risk score at ingestion time, in `[0, 100]`.
    pub safety_score: f64,
    /// When the event was stored.
    pub created_at: DateTime<Utc>,
}

impl SafetyEvent {
    /// Turn a classified event into a stored record.
    ///
    /// A missing publication time becomes `now`. The score is computed by
    /// the caller (see `pulse_risk::score`) against the same `now`.
    pub fn from_classified(
        classified: ClassifiedEvent,
        coordinates: Coordinate,
        safety_score: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            source: classified.source,
            title: classified.title,
            text: classified.text,
            url: classified.url,
            timestamp: classified.published.unwrap_or(now),
            coordinates,
            event_type: classified.event_type,
            severity: classified.severity,
            urgency: classified.urgency,
            address_hint: classified.address_hint,
            notes: classified.notes,
            safety_score,
            created_at: now,
        }
    }
}
