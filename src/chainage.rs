use serde::Serialize;

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A chainage span in meters along the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainageRange {
    pub start_m: i64,
    pub end_m: i64,
}

impl ChainageRange {
    pub fn length_m(self) -> i64 {
        (self.end_m - self.start_m).abs()
    }
}

/// Fixed chainage-to-GPS segment used to place map points. Report chainages
/// are assumed to map proportionally onto this line.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceLine {
    pub range: ChainageRange,
    pub start: GeoPoint,
    pub end: GeoPoint,
}

impl ReferenceLine {
    pub fn locate(&self, offset_m: i64) -> GeoPoint {
        interpolate_position(offset_m, self.range, self.start, self.end)
    }
}

impl Default for ReferenceLine {
    // Survey constants for the corridor the default tables were tuned to.
    fn default() -> Self {
        Self {
            range: ChainageRange {
                start_m: 4_100,
                end_m: 362_500,
            },
            start: GeoPoint {
                lat: 10.310709,
                lon: 77.944926,
            },
            end: GeoPoint {
                lat: 10.306490,
                lon: 77.943170,
            },
        }
    }
}

/// Parses a chainage label into a scalar meter offset. Accepts either a bare
/// non-negative integer (already meters) or `<km>+<m>` with both parts
/// non-negative integers. Any other shape is `None`; malformed labels are a
/// normal, expected outcome.
pub fn parse_chainage(text: &str) -> Option<i64> {
    let text = text.trim();
    match text.split_once('+') {
        Some((km, m)) => {
            let km = parse_meters_part(km)?;
            let m = parse_meters_part(m)?;
            Some(km * 1000 + m)
        }
        None => parse_meters_part(text),
    }
}

fn parse_meters_part(part: &str) -> Option<i64> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Linearly interpolates a coordinate along `range`. The fractional position
/// is clamped to [0, 1], so offsets outside the range saturate to an endpoint
/// instead of extrapolating. A degenerate range yields `start`.
pub fn interpolate_position(
    offset_m: i64,
    range: ChainageRange,
    start: GeoPoint,
    end: GeoPoint,
) -> GeoPoint {
    let span = range.end_m - range.start_m;
    if span == 0 {
        return start;
    }

    let fraction = ((offset_m - range.start_m) as f64 / span as f64).clamp(0.0, 1.0);
    GeoPoint {
        lat: start.lat + (end.lat - start.lat) * fraction,
        lon: start.lon + (end.lon - start.lon) * fraction,
    }
}
