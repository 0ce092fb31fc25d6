//! Great-circle distance on a spherical Earth.

use pulse_types::{BoundingBox, Coordinate};

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates in meters.
///
/// Symmetric, non-negative, and exactly `0.0` for identical points.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for near-antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Lat/lng boxes that together contain every point within
/// `radius_meters` of `center`.
///
/// Used as an index-friendly prefilter before the exact haversine check.
/// Returns one box, or two when the circle crosses the antimeridian (one
/// on each side of it). A circle reaching a pole covers every longitude.
/// A negative or `NaN` radius is treated as zero.
pub fn search_boxes(center: Coordinate, radius_meters: f64) -> Vec<BoundingBox> {
    let angular = radius_meters.max(0.0) / EARTH_RADIUS_METERS;
    let lat_delta = angular.to_degrees();
    let south = center.lat - lat_delta;
    let north = center.lat + lat_delta;
    let band = |west: f64, east: f64| {
        BoundingBox::new(
            Coordinate::new(south.max(-90.0), west),
            Coordinate::new(north.min(90.0), east),
        )
    };

    // Widest longitude offset on the circle: asin(sin r / cos lat).
    let ratio = angular.sin() / center.lat.to_radians().cos();
    if south <= -90.0 || north >= 90.0 || !(0.0..1.0).contains(&ratio) {
        return vec![band(-180.0, 180.0)];
    }
    let lng_delta = ratio.asin().to_degrees();
    let west = center.lng - lng_delta;
    let east = center.lng + lng_delta;

    if west < -180.0 {
        vec![band(-180.0, east), band(west + 360.0, 180.0)]
    } else if east > 180.0 {
        vec![band(west, 180.0), band(-180.0, east - 360.0)]
    } else {
        vec![band(west, east)]
    }
}
