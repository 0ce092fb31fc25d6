//! Geographic value types.
//!
//! All coordinates are WGS-84 degrees. Values are plain `Copy` data; the
//! distance math lives in `pulse-risk`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and inside the valid WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// An axis-aligned box given by its south-west and north-east corners.
///
/// Boxes crossing the antimeridian are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoundingBox {
    /// South-west corner (minimum latitude and longitude).
    pub sw: Coordinate,
    /// North-east corner (maximum latitude and longitude).
    pub ne: Coordinate,
}

impl BoundingBox {
    /// Create a bounding box from its corners.
    pub const fn new(sw: Coordinate, ne: Coordinate) -> Self {
        Self { sw, ne }
    }

    /// Whether the point lies inside the box (edges inclusive).
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.sw.lat..=self.ne.lat).contains(&point.lat)
            && (self.sw.lng..=self.ne.lng).contains(&point.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_contains_is_inclusive() {
        let bbox = BoundingBox::new(Coordinate::new(40.0, -75.0), Coordinate::new(41.0, -73.0));
        assert!(bbox.contains(Coordinate::new(40.5, -74.0)));
        assert!(bbox.contains(Coordinate::new(40.0, -75.0)));
        assert!(bbox.contains(Coordinate::new(41.0, -73.0)));
        assert!(!bbox.contains(Coordinate::new(39.9, -74.0)));
        assert!(!bbox.contains(Coordinate::new(40.5, -72.9)));
    }

    #[test]
    fn coordinate_validity() {
        assert!(Coordinate::new(40.7128, -74.0060).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
    }
}
