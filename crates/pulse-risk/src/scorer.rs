//! Per-event risk score.
//!
//! ```text
//! severity_score = severity / 10 * 100
//! decay          = exp(-hours_since / 24)       (hours_since floored at 0)
//! keyword_impact = 15 if a high-risk term appears, else 8 if a medium-risk
//!                  term appears, else 0
//! score          = clamp(severity_score * decay + keyword_impact, 0, 100)
//! ```
//!
//! The function never fails: severity is already clamped by
//! [`Severity`], and a missing timestamp means "happened now".

use chrono::{DateTime, Utc};
use pulse_types::{ClassifiedEvent, SafetyEvent, Severity};

/// Upper bound of every risk score.
pub const MAX_SCORE: f64 = 100.0;

/// Decay time constant in hours (score falls to 1/e after a day).
pub const DECAY_HOURS: f64 = 24.0;

/// Bonus for any high-risk keyword.
pub const HIGH_RISK_IMPACT: f64 = 15.0;

/// Bonus for any medium-risk keyword, applied only without a high-risk match.
pub const MEDIUM_RISK_IMPACT: f64 = 8.0;

/// Life-threatening violence and hazards.
pub const HIGH_RISK_KEYWORDS: [&str; 6] =
    ["shooting", "murder", "homicide", "stabbing", "fire", "explosion"];

/// Property crime, accidents and emergencies.
pub const MEDIUM_RISK_KEYWORDS: [&str; 5] =
    ["assault", "robbery", "accident", "crash", "emergency"];

/// Read-only view of the event fields the scorer consumes.
pub trait RiskInput {
    /// Classifier severity.
    fn severity(&self) -> Severity;
    /// When the event happened, if known.
    fn occurred_at(&self) -> Option<DateTime<Utc>>;
    /// Headline.
    fn title(&self) -> &str;
    /// Body text.
    fn body(&self) -> &str;
}

impl RiskInput for SafetyEvent {
    fn severity(&self) -> Severity {
        self.severity
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.text
    }
}

impl RiskInput for ClassifiedEvent {
    fn severity(&self) -> Severity {
        self.severity
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.text
    }
}

/// Risk score of one event at instant `now`, in `[0, 100]`.
pub fn score(event: &impl RiskInput, now: DateTime<Utc>) -> f64 {
    let hours = hours_since(event.occurred_at().unwrap_or(now), now);
    let impact = keyword_impact(event.title(), event.body());
    let raw = severity_score(event.severity()).mul_add(recency_decay(hours), impact);
    raw.clamp(0.0, MAX_SCORE)
}

/// Severity rescaled to `[10, 100]`.
pub fn severity_score(severity: Severity) -> f64 {
    f64::from(severity.get()) / 10.0 * 100.0
}

/// Age of an event in hours, never negative (future timestamps count as now).
pub fn hours_since(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(timestamp);
    let millis = elapsed.num_milliseconds();
    if millis <= 0 {
        return 0.0;
    }
    // Millisecond resolution; i64 -> f64 loses nothing below ~285k years.
    #[allow(clippy::cast_precision_loss)]
    let hours = millis as f64 / 3_600_000.0;
    hours
}

/// Exponential recency factor in `(0, 1]`.
pub fn recency_decay(hours_since: f64) -> f64 {
    if hours_since.is_nan() {
        return 1.0;
    }
    (-hours_since.max(0.0) / DECAY_HOURS).exp()
}

/// Keyword bonus for the lower-cased `title + " " + body`.
///
/// Matching is by substring. The high tier is checked first and the tiers
/// are mutually exclusive.
pub fn keyword_impact(title: &str, body: &str) -> f64 {
    let text = format!("{title} {body}").to_lowercase();
    if HIGH_RISK_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        HIGH_RISK_IMPACT
    } else if MEDIUM_RISK_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        MEDIUM_RISK_IMPACT
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pulse_types::{Coordinate, EventId, EventType};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn event(severity: i64, hours_ago: i64, title: &str, text: &str) -> SafetyEvent {
        SafetyEvent {
            id: EventId::new(),
            source: String::from("test"),
            title: title.to_owned(),
            text: text.to_owned(),
            url: String::new(),
            timestamp: now() - Duration::hours(hours_ago),
            coordinates: Coordinate::new(40.0, -74.0),
            event_type: EventType::Other,
            severity: Severity::from_raw(Some(severity)),
            urgency: 0,
            address_hint: None,
            notes: String::new(),
            safety_score: 0.0,
            created_at: now(),
        }
    }

    fn classified(severity: Option<i64>, published: Option<DateTime<Utc>>) -> ClassifiedEvent {
        ClassifiedEvent {
            source: String::new(),
            title: String::from("Report"),
            text: String::from("Something happened"),
            url: String::new(),
            published,
            coordinates: None,
            event_type: EventType::Other,
            severity: Severity::from_raw(severity),
            urgency: 0,
            address_hint: None,
            notes: String::new(),
        }
    }

    #[test]
    fn recent_shooting_is_clamped_high() {
        // 90 * e^(-1/24) + 15 ~= 101.3, clamped to 100.
        let s = score(&event(9, 1, "Shooting reported", ""), now());
        assert!(s >= 90.0);
        assert!((s - 100.0).abs() < 1e-9);
    }

    #[test]
    fn older_event_scores_lower() {
        let recent = score(&event(9, 1, "shooting reported", ""), now());
        let old = score(&event(9, 48, "shooting reported", ""), now());
        assert!(old < recent);
        // 90 * e^-2 + 15
        let expected = 90.0 * (-2.0_f64).exp() + 15.0;
        assert!((old - expected).abs() < 1e-9);
    }

    #[test]
    fn monotonic_in_severity_at_age_zero() {
        let mut previous = f64::MIN;
        for severity in 1..=10 {
            let s = score(&event(severity, 0, "General report", ""), now());
            assert!(s >= previous, "severity {severity} scored {s} < {previous}");
            previous = s;
        }
    }

    #[test]
    fn monotonic_in_age() {
        let mut previous = f64::MAX;
        for hours in [0, 1, 2, 6, 12, 24, 48, 96, 720] {
            let s = score(&event(6, hours, "Crash on the bridge", ""), now());
            assert!(s <= previous, "age {hours}h scored {s} > {previous}");
            previous = s;
        }
    }

    #[test]
    fn tiers_are_mutually_exclusive() {
        assert!((keyword_impact("Shooting and robbery", "") - HIGH_RISK_IMPACT).abs() < 1e-12);
        assert!((keyword_impact("Robbery", "car CRASH") - MEDIUM_RISK_IMPACT).abs() < 1e-12);
        assert!(keyword_impact("Parade", "street fair").abs() < 1e-12);
    }

    #[test]
    fn keywords_match_substrings_across_title_and_body() {
        // "firefighters" contains "fire".
        assert!((keyword_impact("Update", "Firefighters on scene") - HIGH_RISK_IMPACT).abs() < 1e-12);
        assert!((keyword_impact("EMERGENCY", "") - MEDIUM_RISK_IMPACT).abs() < 1e-12);
    }

    #[test]
    fn missing_timestamp_means_no_decay() {
        let s = score(&classified(Some(5), None), now());
        assert!((s - 50.0).abs() < 1e-9);
    }

    #[test]
    fn missing_severity_defaults_to_five() {
        let s = score(&classified(None, Some(now())), now());
        assert!((s - 50.0).abs() < 1e-9);
    }

    #[test]
    fn future_timestamp_is_treated_as_now() {
        let future = now() + Duration::hours(5);
        let s = score(&classified(Some(7), Some(future)), now());
        assert!((s - 70.0).abs() < 1e-9);
    }

    #[test]
    fn always_within_bounds() {
        let ages = [0, 1, 24, 24 * 365, 24 * 365 * 50];
        for severity in [-5, 0, 1, 5, 10, 99] {
            for hours in ages {
                for title in ["", "explosion", "accident", "quiet"] {
                    let s = score(&event(severity, hours, title, "murder robbery"), now());
                    assert!((0.0..=MAX_SCORE).contains(&s), "{s} out of range");
                }
            }
        }
    }

    #[test]
    fn decay_is_bounded() {
        assert!((recency_decay(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((recency_decay(-3.0) - 1.0).abs() < f64::EPSILON);
        assert!((recency_decay(f64::NAN) - 1.0).abs() < f64::EPSILON);
        assert!(recency_decay(f64::INFINITY).abs() < f64::EPSILON);
        let day = recency_decay(24.0);
        assert!((day - (-1.0_f64).exp()).abs() < 1e-12);
    }
}
