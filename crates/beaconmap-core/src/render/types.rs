//! Types exchanged with a rendering surface

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregate::Rgb;
use crate::telemetry::TelemetryRecord;

/// Coordinate pair as `[latitude, longitude]`
pub type LatLng = [f64; 2];

/// Axis-aligned geographic bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum latitude
    pub south: f64,
    /// Minimum longitude
    pub west: f64,
    /// Maximum latitude
    pub north: f64,
    /// Maximum longitude
    pub east: f64,
}

impl Bounds {
    /// Degenerate box around one point
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south: point[0],
            west: point[1],
            north: point[0],
            east: point[1],
        }
    }

    /// Smallest box containing every point, `None` when there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(*iter.next()?);
        for point in iter {
            bounds.extend(*point);
        }
        Some(bounds)
    }

    /// Grow the box to contain `point`
    pub fn extend(&mut self, point: LatLng) {
        self.south = self.south.min(point[0]);
        self.north = self.north.max(point[0]);
        self.west = self.west.min(point[1]);
        self.east = self.east.max(point[1]);
    }

    /// Whether `point` lies inside the box (edges included)
    pub fn contains(&self, point: LatLng) -> bool {
        point[0] >= self.south
            && point[0] <= self.north
            && point[1] >= self.west
            && point[1] <= self.east
    }
}

/// Circle marker appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Radius in pixels
    pub radius: f64,
    /// Outline colour
    pub stroke: Rgb,
    /// Outline width in pixels
    pub weight: f64,
    /// Outline opacity
    pub opacity: f64,
    /// Fill opacity
    pub fill_opacity: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 5.0,
            stroke: Rgb::BLACK,
            weight: 1.0,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

/// Details shown when a marker is selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetail {
    /// Beacon identifier
    pub beacon_id: String,
    /// Timestamp as recorded
    pub localized_timestamp: String,
    /// Signal value
    pub data: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Heading in degrees
    pub azimuth: f64,
}

impl From<&TelemetryRecord> for MarkerDetail {
    fn from(record: &TelemetryRecord) -> Self {
        Self {
            beacon_id: record.beacon_id.clone(),
            localized_timestamp: record.localized_timestamp.clone(),
            data: record.data,
            latitude: record.latitude,
            longitude: record.longitude,
            azimuth: record.azimuth,
        }
    }
}

impl MarkerDetail {
    /// Popup text, one `Label: value` pair per line
    pub fn popup_text(&self) -> String {
        format!(
            "Beacon ID: {}\nTime: {}\nValue: {}\nLatitude: {:.6}\nLongitude: {:.6}\nAzimuth: {:.2}°",
            self.beacon_id,
            self.localized_timestamp,
            self.data,
            self.latitude,
            self.longitude,
            self.azimuth
        )
    }
}

/// A point marker ready to draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// `[lat, lng]`
    pub position: LatLng,
    /// Shaded fill colour
    pub fill: Rgb,
    /// Popup payload
    pub detail: MarkerDetail,
}

/// One row of the beacon filter control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Beacon identifier
    pub beacon_id: String,
    /// Palette colour shown next to the label
    pub color: Rgb,
    /// Whether the beacon is visible
    pub checked: bool,
}

/// Status line shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StatusMessage {
    /// A load is in progress
    Loading,
    /// Data fully rendered
    Loaded,
    /// Data rendered, but at least one beacon was downsampled or truncated
    LoadedLimited {
        /// Point budget per beacon
        max_points: usize,
    },
    /// The session resource could not be fetched
    FetchFailed(String),
    /// The session body could not be parsed
    ParseFailed(String),
}

impl StatusMessage {
    /// Whether the message reports a failure
    pub fn is_error(&self) -> bool {
        matches!(self, StatusMessage::FetchFailed(_) | StatusMessage::ParseFailed(_))
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Loading => write!(f, "Loading data..."),
            StatusMessage::Loaded => write!(f, "Data loaded."),
            StatusMessage::LoadedLimited { max_points } => write!(
                f,
                "Data loaded. Limited to {} points per beacon.",
                max_points
            ),
            StatusMessage::FetchFailed(msg) => write!(f, "Error loading data: {}", msg),
            StatusMessage::ParseFailed(msg) => write!(f, "Error parsing data: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let points = [[40.0, -3.0], [41.5, -4.0], [39.5, -2.5]];
        let b = Bounds::from_points(&points).unwrap();
        assert_eq!(b.south, 39.5);
        assert_eq!(b.north, 41.5);
        assert_eq!(b.west, -4.0);
        assert_eq!(b.east, -2.5);
        assert!(points.iter().all(|p| b.contains(*p)));
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_popup_text() {
        let record = TelemetryRecord::new("b7", "2024-05-01 10:00:00", 40.4168, -3.7038, 1250.0, 87.456);
        let text = MarkerDetail::from(&record).popup_text();
        assert_eq!(
            text,
            "Beacon ID: b7\nTime: 2024-05-01 10:00:00\nValue: 1250\n\
             Latitude: 40.416800\nLongitude: -3.703800\nAzimuth: 87.46°"
        );
    }

    #[test]
    fn test_status_text() {
        assert_eq!(StatusMessage::Loading.to_string(), "Loading data...");
        assert_eq!(
            StatusMessage::LoadedLimited { max_points: 3000 }.to_string(),
            "Data loaded. Limited to 3000 points per beacon."
        );
        assert!(StatusMessage::FetchFailed("HTTP error! status: 404".into()).is_error());
        assert!(!StatusMessage::Loaded.is_error());
    }
}
