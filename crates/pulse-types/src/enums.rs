//! Enumeration types for the Urban Pulse risk engine.
//!
//! All enums travel as `snake_case` strings on the wire, matching what the
//! classifier emits and what the map frontend sends.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event categories
// ---------------------------------------------------------------------------

/// Category assigned to an event by the classifier.
///
/// Unknown category strings deserialize to [`EventType::Other`] so a
/// classifier vocabulary change never rejects an otherwise valid event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// Violent or life-threatening crime.
    MajorCrime,
    /// Theft, vandalism and similar property crime.
    MinorCrime,
    /// Traffic or other accidents.
    Accident,
    /// Fire, flood, storm, hazardous material.
    Environmental,
    /// Outages, closures, construction.
    Infrastructure,
    /// Protests, riots, crowd disturbances.
    PublicDisorder,
    /// Anything else.
    #[default]
    #[serde(other)]
    Other,
}

impl EventType {
    /// The `snake_case` name used on the wire and in the `safety_events` table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MajorCrime => "major_crime",
            Self::MinorCrime => "minor_crime",
            Self::Accident => "accident",
            Self::Environmental => "environmental",
            Self::Infrastructure => "infrastructure",
            Self::PublicDisorder => "public_disorder",
            Self::Other => "other",
        }
    }

    /// Parse a stored category name. Unknown names map to [`EventType::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "major_crime" => Self::MajorCrime,
            "minor_crime" => Self::MinorCrime,
            "accident" => Self::Accident,
            "environmental" => Self::Environmental,
            "infrastructure" => Self::Infrastructure,
            "public_disorder" => Self::PublicDisorder,
            _ => Self::Other,
        }
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Route selection
// ---------------------------------------------------------------------------

/// Route selection policy.
///
/// Any value other than `fastest` selects [`Preference::Safest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Preference {
    /// Minimize travel time.
    Fastest,
    /// Minimize the weighted blend of normalized distance and risk.
    #[default]
    #[serde(other)]
    Safest,
}

impl Preference {
    /// The `snake_case` name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fastest => "fastest",
            Self::Safest => "safest",
        }
    }
}

/// Travel mode forwarded to the route provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TravelMode {
    /// Car routing.
    #[default]
    Driving,
    /// Pedestrian routing.
    Walking,
    /// Bicycle routing.
    Bicycling,
    /// Public transit routing.
    Transit,
}

impl TravelMode {
    /// The `snake_case` name expected by directions APIs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}
