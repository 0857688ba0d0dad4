//! Telemetry records
//!
//! One parsed row of a beacon session file.

use serde::{Deserialize, Serialize};

/// Column holding the beacon identifier
pub const COL_BEACON_ID: &str = "beacon_id";
/// Column holding the localized timestamp
pub const COL_TIMESTAMP: &str = "localized_timestamp";
/// Column holding the latitude in degrees
pub const COL_LATITUDE: &str = "latitude";
/// Column holding the longitude in degrees
pub const COL_LONGITUDE: &str = "longitude";
/// Column holding the measured signal value
pub const COL_DATA: &str = "data";
/// Column holding the azimuth in degrees
pub const COL_AZIMUTH: &str = "azimuth";

/// Columns a session body must declare in its header row
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_BEACON_ID, COL_LATITUDE, COL_LONGITUDE];

/// A single telemetry sample reported by one beacon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Beacon identifier
    pub beacon_id: String,
    /// Timestamp as written by the recorder (not interpreted)
    pub localized_timestamp: String,
    /// Latitude in degrees, NaN when missing or not numeric
    pub latitude: f64,
    /// Longitude in degrees, NaN when missing or not numeric
    pub longitude: f64,
    /// Measured value driving marker intensity, NaN when missing
    pub data: f64,
    /// Azimuth in degrees, NaN when missing
    pub azimuth: f64,
}

impl TelemetryRecord {
    /// Create a new record
    pub fn new(
        beacon_id: impl Into<String>,
        localized_timestamp: impl Into<String>,
        latitude: f64,
        longitude: f64,
        data: f64,
        azimuth: f64,
    ) -> Self {
        Self {
            beacon_id: beacon_id.into(),
            localized_timestamp: localized_timestamp.into(),
            latitude,
            longitude,
            data,
            azimuth,
        }
    }

    /// Whether both coordinates are usable for drawing
    pub fn is_located(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Coordinate pair as `[latitude, longitude]`
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Coerce a raw field into a number.
///
/// Empty and non-numeric fields become NaN rather than an error, so a row
/// with a broken coordinate is kept in the series and simply not drawn.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Drop the first `count` lines of a session resource.
///
/// Session files carry non-tabular preamble lines before the CSV header row.
pub fn strip_header_lines(text: &str, count: usize) -> &str {
    if count == 0 {
        return text;
    }
    text.splitn(count + 1, '\n').nth(count).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_header_lines() {
        let text = "{\"device\":\"x\"}\n{\"fw\":2}\nbeacon_id,latitude\nb1,1.0\n";
        assert_eq!(strip_header_lines(text, 2), "beacon_id,latitude\nb1,1.0\n");
        assert_eq!(strip_header_lines(text, 0), text);
        assert_eq!(strip_header_lines("only\none", 2), "");
        assert_eq!(strip_header_lines("", 2), "");
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(" 12.5 "), 12.5);
        assert_eq!(coerce_number("-3"), -3.0);
        assert!(coerce_number("").is_nan());
        assert!(coerce_number("north").is_nan());
    }

    #[test]
    fn test_is_located() {
        let ok = TelemetryRecord::new("b1", "t", 40.4, -3.7, 100.0, 90.0);
        assert!(ok.is_located());

        let bad = TelemetryRecord::new("b1", "t", 40.4, f64::NAN, 100.0, 90.0);
        assert!(!bad.is_located());

        let inf = TelemetryRecord::new("b1", "t", f64::INFINITY, 0.0, 100.0, 90.0);
        assert!(!inf.is_located());
    }
}
