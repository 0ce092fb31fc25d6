//! Sample events for demo mode.
//!
//! Ten incidents spread over Manhattan, Brooklyn and Queens, aged between one
//! and fifteen hours relative to `now`. Scores are computed at seed time so
//! they reflect the same decay the engine applies everywhere else.

use chrono::{DateTime, Duration, Utc};
use pulse_types::{ClassifiedEvent, Coordinate, EventType, SafetyEvent, Severity};

/// Source tag carried by every demo event.
pub const DEMO_SOURCE: &str = "demo:seed";

struct DemoSeed {
    title: &'static str,
    text: &'static str,
    hours_ago: i64,
    lat: f64,
    lng: f64,
    event_type: EventType,
    severity: i64,
    urgency: u32,
    address_hint: &'static str,
    notes: &'static str,
}

const SEEDS: [DemoSeed; 10] = [
    DemoSeed {
        title: "Traffic Accident on Broadway",
        text: "Multi-vehicle accident reported on Broadway near Times Square. Emergency services on scene.",
        hours_ago: 2,
        lat: 40.7580,
        lng: -73.9857,
        event_type: EventType::Accident,
        severity: 6,
        urgency: 40,
        address_hint: "Broadway, Times Square",
        notes: "Demo event: traffic accident",
    },
    DemoSeed {
        title: "Theft Reported in Central Park",
        text: "Petty theft incident reported near Central Park entrance. Police investigating.",
        hours_ago: 5,
        lat: 40.7829,
        lng: -73.9654,
        event_type: EventType::MinorCrime,
        severity: 4,
        urgency: 20,
        address_hint: "Central Park",
        notes: "Demo event: minor crime",
    },
    DemoSeed {
        title: "Fire Alarm in Financial District",
        text: "Fire alarm activated in office building. Fire department responding.",
        hours_ago: 1,
        lat: 40.7128,
        lng: -74.0060,
        event_type: EventType::Environmental,
        severity: 7,
        urgency: 60,
        address_hint: "Financial District",
        notes: "Demo event: fire alarm",
    },
    DemoSeed {
        title: "Road Closure on Brooklyn Bridge",
        text: "Scheduled maintenance causing road closure on Brooklyn Bridge. Use alternate route.",
        hours_ago: 12,
        lat: 40.7061,
        lng: -73.9969,
        event_type: EventType::Infrastructure,
        severity: 5,
        urgency: 30,
        address_hint: "Brooklyn Bridge",
        notes: "Demo event: infrastructure",
    },
    DemoSeed {
        title: "Assault Reported in Queens",
        text: "Assault incident reported. Police investigation ongoing.",
        hours_ago: 8,
        lat: 40.7282,
        lng: -73.9442,
        event_type: EventType::MajorCrime,
        severity: 8,
        urgency: 70,
        address_hint: "Queens",
        notes: "Demo event: major crime",
    },
    DemoSeed {
        title: "Car Crash on FDR Drive",
        text: "Two-car collision on FDR Drive causing traffic delays.",
        hours_ago: 3,
        lat: 40.7505,
        lng: -73.9712,
        event_type: EventType::Accident,
        severity: 5,
        urgency: 35,
        address_hint: "FDR Drive",
        notes: "Demo event: car crash",
    },
    DemoSeed {
        title: "Vandalism in Lower East Side",
        text: "Property damage reported. Minor vandalism incident.",
        hours_ago: 15,
        lat: 40.7181,
        lng: -73.9903,
        event_type: EventType::MinorCrime,
        severity: 3,
        urgency: 10,
        address_hint: "Lower East Side",
        notes: "Demo event: vandalism",
    },
    DemoSeed {
        title: "Power Outage in Upper West Side",
        text: "Temporary power outage affecting several blocks. Utility company working on restoration.",
        hours_ago: 6,
        lat: 40.7851,
        lng: -73.9772,
        event_type: EventType::Infrastructure,
        severity: 6,
        urgency: 40,
        address_hint: "Upper West Side",
        notes: "Demo event: power outage",
    },
    DemoSeed {
        title: "Protest Activity in Midtown",
        text: "Peaceful protest gathering reported. Increased police presence.",
        hours_ago: 4,
        lat: 40.7549,
        lng: -73.9851,
        event_type: EventType::PublicDisorder,
        severity: 4,
        urgency: 25,
        address_hint: "Midtown",
        notes: "Demo event: protest",
    },
    DemoSeed {
        title: "Burglary Attempt in Harlem",
        text: "Attempted burglary reported. Suspect fled scene. Police investigating.",
        hours_ago: 10,
        lat: 40.8075,
        lng: -73.9442,
        event_type: EventType::MinorCrime,
        severity: 5,
        urgency: 30,
        address_hint: "Harlem",
        notes: "Demo event: burglary",
    },
];

/// Build the demo event set relative to `now`, scored against `now`.
pub fn demo_events(now: DateTime<Utc>) -> Vec<SafetyEvent> {
    SEEDS
        .iter()
        .map(|seed| {
            let classified = ClassifiedEvent {
                source: DEMO_SOURCE.to_owned(),
                title: seed.title.to_owned(),
                text: seed.text.to_owned(),
                url: String::new(),
                published: now.checked_sub_signed(Duration::hours(seed.hours_ago)),
                coordinates: Some(Coordinate::new(seed.lat, seed.lng)),
                event_type: seed.event_type,
                severity: Severity::from_raw(Some(seed.severity)),
                urgency: seed.urgency,
                address_hint: Some(seed.address_hint.to_owned()),
                notes: seed.notes.to_owned(),
            };
            let safety_score = pulse_risk::score(&classified, now);
            let coordinates = Coordinate::new(seed.lat, seed.lng);
            SafetyEvent::from_classified(classified, coordinates, safety_score, now)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_events_are_valid_and_scored() {
        let now = Utc::now();
        let events = demo_events(now);
        assert_eq!(events.len(), SEEDS.len());
        for event in &events {
            assert!(event.coordinates.is_valid());
            assert!(event.timestamp < now);
            assert!((0.0..=100.0).contains(&event.safety_score));
            assert_eq!(event.source, DEMO_SOURCE);
        }
    }

    #[test]
    fn fresh_fire_alarm_outscores_old_vandalism() {
        let now = Utc::now();
        let events = demo_events(now);
        let score_of = |title: &str| {
            events
                .iter()
                .find(|e| e.title == title)
                .map(|e| e.safety_score)
                .unwrap_or_default()
        };
        assert!(
            score_of("Fire Alarm in Financial District") > score_of("Vandalism in Lower East Side")
        );
    }
}
