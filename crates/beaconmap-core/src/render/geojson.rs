//! GeoJSON rendering surface
//!
//! Keeps the drawn layers in memory and exports the visible ones as a GeoJSON
//! `FeatureCollection`. Useful headless, from the CLI and in tests.

use serde_json::{json, Value};

use super::{Bounds, FilterEntry, LatLng, Marker, MarkerStyle, RenderSurface, StatusMessage};
use crate::aggregate::Rgb;

/// Contents of one layer group
#[derive(Debug, Clone, Default)]
struct LayerGroup {
    visible: bool,
    paths: Vec<(Vec<LatLng>, Rgb)>,
    markers: Vec<(Marker, MarkerStyle)>,
}

/// In-memory surface exporting GeoJSON
#[derive(Debug, Clone, Default)]
pub struct GeoJsonSurface {
    /// Layer groups in creation order
    groups: Vec<(String, LayerGroup)>,
    /// Last fitted viewport
    viewport: Option<Bounds>,
    /// Current filter control entries
    filter_control: Option<Vec<FilterEntry>>,
    /// Current status line
    status: Option<StatusMessage>,
}

impl GeoJsonSurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    fn group(&self, name: &str) -> Option<&LayerGroup> {
        self.groups.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }

    fn group_mut(&mut self, name: &str) -> Option<&mut LayerGroup> {
        self.groups
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, g)| g)
    }

    /// Names of all layer groups, in creation order
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Whether a group exists and is shown
    pub fn is_visible(&self, group: &str) -> bool {
        self.group(group).map(|g| g.visible).unwrap_or(false)
    }

    /// Paths drawn in a group
    pub fn paths(&self, group: &str) -> Vec<&[LatLng]> {
        self.group(group)
            .map(|g| g.paths.iter().map(|(p, _)| p.as_slice()).collect())
            .unwrap_or_default()
    }

    /// Markers drawn in a group
    pub fn markers(&self, group: &str) -> Vec<&Marker> {
        self.group(group)
            .map(|g| g.markers.iter().map(|(m, _)| m).collect())
            .unwrap_or_default()
    }

    /// Last fitted viewport
    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    /// Current filter control entries
    pub fn filter_control(&self) -> Option<&[FilterEntry]> {
        self.filter_control.as_deref()
    }

    /// Current status line
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Export visible groups as a GeoJSON `FeatureCollection`.
    ///
    /// Coordinates are written in GeoJSON order (`[longitude, latitude]`).
    pub fn to_feature_collection(&self) -> Value {
        let mut features = Vec::new();

        for (name, group) in self.groups.iter().filter(|(_, g)| g.visible) {
            for (path, color) in &group.paths {
                let coordinates: Vec<[f64; 2]> = path.iter().map(|p| [p[1], p[0]]).collect();
                features.push(json!({
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": coordinates },
                    "properties": {
                        "beacon_id": name,
                        "kind": "path",
                        "stroke": color.to_css_hex(),
                    }
                }));
            }

            for (marker, style) in &group.markers {
                let d = &marker.detail;
                features.push(json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [marker.position[1], marker.position[0]],
                    },
                    "properties": {
                        "beacon_id": name,
                        "kind": "marker",
                        "fill": marker.fill.to_css_hex(),
                        "fill_opacity": style.fill_opacity,
                        "stroke": style.stroke.to_css_hex(),
                        "stroke_width": style.weight,
                        "stroke_opacity": style.opacity,
                        "radius": style.radius,
                        "localized_timestamp": d.localized_timestamp,
                        "data": finite_or_null(d.data),
                        "azimuth": finite_or_null(d.azimuth),
                        "popup": d.popup_text(),
                    }
                }));
            }
        }

        let mut collection = json!({
            "type": "FeatureCollection",
            "features": features,
        });
        if let Some(b) = self.viewport {
            collection["bbox"] = json!([b.west, b.south, b.east, b.north]);
        }
        collection
    }
}

fn finite_or_null(value: f64) -> Value {
    if value.is_finite() {
        json!(value)
    } else {
        Value::Null
    }
}

impl RenderSurface for GeoJsonSurface {
    fn add_layer_group(&mut self, group: &str) {
        match self.group_mut(group) {
            Some(existing) => existing.visible = true,
            None => self.groups.push((
                group.to_string(),
                LayerGroup {
                    visible: true,
                    ..LayerGroup::default()
                },
            )),
        }
    }

    fn remove_layer_group(&mut self, group: &str) {
        self.groups.retain(|(n, _)| n != group);
    }

    fn set_layer_visible(&mut self, group: &str, visible: bool) {
        if let Some(g) = self.group_mut(group) {
            g.visible = visible;
        }
    }

    fn draw_path(&mut self, group: &str, path: &[LatLng], color: Rgb) {
        if let Some(g) = self.group_mut(group) {
            g.paths.push((path.to_vec(), color));
        }
    }

    fn draw_marker(&mut self, group: &str, marker: &Marker, style: &MarkerStyle) {
        if let Some(g) = self.group_mut(group) {
            g.markers.push((marker.clone(), style.clone()));
        }
    }

    fn clear_markers(&mut self, group: &str) {
        if let Some(g) = self.group_mut(group) {
            g.markers.clear();
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.viewport = Some(bounds);
    }

    fn set_filter_control(&mut self, entries: &[FilterEntry]) {
        self.filter_control = Some(entries.to_vec());
    }

    fn remove_filter_control(&mut self) {
        self.filter_control = None;
    }

    fn set_status(&mut self, status: &StatusMessage) {
        self.status = Some(status.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MarkerDetail;
    use crate::telemetry::TelemetryRecord;

    fn marker(lat: f64, lng: f64) -> Marker {
        let record = TelemetryRecord::new("b1", "t0", lat, lng, 900.0, 45.0);
        Marker {
            position: [lat, lng],
            fill: Rgb::new(10, 20, 30),
            detail: MarkerDetail::from(&record),
        }
    }

    #[test]
    fn test_hidden_groups_are_not_exported() {
        let mut surface = GeoJsonSurface::new();
        surface.add_layer_group("b1");
        surface.draw_path("b1", &[[40.0, -3.0], [40.1, -3.1]], Rgb::new(255, 0, 0));
        surface.draw_marker("b1", &marker(40.0, -3.0), &MarkerStyle::default());

        let fc = surface.to_feature_collection();
        assert_eq!(fc["features"].as_array().unwrap().len(), 2);

        surface.set_layer_visible("b1", false);
        let fc = surface.to_feature_collection();
        assert!(fc["features"].as_array().unwrap().is_empty());
        assert_eq!(surface.markers("b1").len(), 1);
    }

    #[test]
    fn test_coordinates_are_lon_lat() {
        let mut surface = GeoJsonSurface::new();
        surface.add_layer_group("b1");
        surface.draw_marker("b1", &marker(40.5, -3.25), &MarkerStyle::default());
        surface.fit_bounds(Bounds::from_point([40.5, -3.25]));

        let fc = surface.to_feature_collection();
        let feature = &fc["features"][0];
        assert_eq!(feature["geometry"]["coordinates"], json!([-3.25, 40.5]));
        assert_eq!(feature["properties"]["fill"], "#0a141e");
        assert_eq!(fc["bbox"], json!([-3.25, 40.5, -3.25, 40.5]));
    }

    #[test]
    fn test_clear_markers_keeps_path() {
        let mut surface = GeoJsonSurface::new();
        surface.add_layer_group("b1");
        surface.draw_path("b1", &[[1.0, 2.0]], Rgb::BLACK);
        surface.draw_marker("b1", &marker(1.0, 2.0), &MarkerStyle::default());
        surface.clear_markers("b1");

        assert!(surface.markers("b1").is_empty());
        assert_eq!(surface.paths("b1").len(), 1);

        surface.remove_layer_group("b1");
        assert!(surface.group_names().is_empty());
    }

    #[test]
    fn test_drawing_into_unknown_group_is_ignored() {
        let mut surface = GeoJsonSurface::new();
        surface.draw_marker("ghost", &marker(1.0, 2.0), &MarkerStyle::default());
        assert!(surface.markers("ghost").is_empty());
        assert!(!surface.is_visible("ghost"));
    }
}
