//! Encoded polyline codec (5-bit groups, zig-zag deltas, 1e5 fixed point).
//!
//! Route providers return geometry in this compact format. [`decode`] is
//! lenient: malformed input yields an empty path so a broken geometry
//! degrades one route to "no samples" instead of failing the comparison.
//! [`try_decode`] exposes the reason for callers that want it.

use pulse_types::Coordinate;

use crate::error::PolylineError;

/// Fixed-point scale of the format (five decimal places).
const SCALE: f64 = 1e5;

/// Offset added to every 6-bit chunk to land in printable ASCII.
const CHAR_OFFSET: u8 = 63;

/// Continuation flag inside a chunk.
const CONTINUATION: u64 = 0x20;

/// Payload bits inside a chunk.
const CHUNK_MASK: u64 = 0x1f;

/// Largest shift a 32-bit value can need (seven 5-bit groups).
const MAX_SHIFT: u32 = 30;

/// Decode a polyline, returning an empty path on malformed input.
pub fn decode(encoded: &str) -> Vec<Coordinate> {
    try_decode(encoded).unwrap_or_else(|e| {
        tracing::debug!(error = %e, len = encoded.len(), "Discarding malformed polyline");
        Vec::new()
    })
}

/// Decode a polyline, reporting why malformed input was rejected.
pub fn try_decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut coords = Vec::with_capacity(bytes.len() / 8);
    let mut offset = 0;
    let mut lat: i32 = 0;
    let mut lng: i32 = 0;

    while offset < bytes.len() {
        let (dlat, after_lat) = read_value(bytes, offset)?;
        if after_lat >= bytes.len() {
            return Err(PolylineError::UnpairedLatitude);
        }
        let (dlng, after_lng) = read_value(bytes, after_lat)?;

        lat = lat
            .checked_add(dlat)
            .ok_or(PolylineError::Overflow { offset })?;
        lng = lng
            .checked_add(dlng)
            .ok_or(PolylineError::Overflow { offset: after_lat })?;
        coords.push(Coordinate::new(f64::from(lat) / SCALE, f64::from(lng) / SCALE));

        offset = after_lng;
    }

    Ok(coords)
}

/// Read one zig-zag encoded value starting at `start`.
///
/// Returns the signed value and the offset just past it.
fn read_value(bytes: &[u8], start: usize) -> Result<(i32, usize), PolylineError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    let mut offset = start;

    loop {
        let Some(&byte) = bytes.get(offset) else {
            return Err(PolylineError::Truncated);
        };
        if !(CHAR_OFFSET..=b'~').contains(&byte) {
            return Err(PolylineError::InvalidByte { byte, offset });
        }
        let chunk = u64::from(byte.wrapping_sub(CHAR_OFFSET));
        result |= (chunk & CHUNK_MASK) << shift;
        offset = offset.saturating_add(1);

        if chunk & CONTINUATION == 0 {
            break;
        }
        shift = shift.saturating_add(5);
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { offset: start });
        }
    }

    let raw = u32::try_from(result)
        .ok()
        .ok_or(PolylineError::Overflow { offset: start })?;
    let half = i64::from(raw >> 1);
    let value = if raw & 1 == 1 { !half } else { half };
    let value = i32::try_from(value)
        .ok()
        .ok_or(PolylineError::Overflow { offset: start })?;
    Ok((value, offset))
}

/// Encode a path in the polyline format.
///
/// Coordinates are rounded to five decimal places, so
/// `decode(&encode(path))` matches `path` within `1e-5` degrees.
pub fn encode(path: &[Coordinate]) -> String {
    let mut out = String::with_capacity(path.len().saturating_mul(8));
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in path {
        let lat = to_fixed(point.lat);
        let lng = to_fixed(point.lng);
        write_value(&mut out, lat.saturating_sub(prev_lat));
        write_value(&mut out, lng.saturating_sub(prev_lng));
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

#[allow(clippy::cast_possible_truncation)]
fn to_fixed(degrees: f64) -> i64 {
    // Valid coordinates are at most 180 * 1e5, far inside i64.
    (degrees * SCALE).round() as i64
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn write_value(out: &mut String, delta: i64) {
    let shifted = delta.wrapping_shl(1);
    let mut value = (if delta < 0 { !shifted } else { shifted }) as u64;
    while value >= CONTINUATION {
        let chunk = (CONTINUATION | (value & CHUNK_MASK)) as u8;
        out.push(char::from(chunk.wrapping_add(CHAR_OFFSET)));
        value >>= 5;
    }
    out.push(char::from((value as u8).wrapping_add(CHAR_OFFSET)));
}
