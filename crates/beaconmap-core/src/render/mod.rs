//! Map Rendering
//!
//! The drawing side of the pipeline is an external collaborator. This module
//! defines what the aggregator hands it ([`RenderSurface`]) and ships one
//! in-memory implementation that exports GeoJSON.

mod geojson;
mod types;

pub use geojson::GeoJsonSurface;
pub use types::{Bounds, FilterEntry, LatLng, Marker, MarkerDetail, MarkerStyle, StatusMessage};

use crate::aggregate::{BeaconLayer, Rgb};

/// Abstraction over a map widget that can draw beacon layers
pub trait RenderSurface {
    /// Create an empty, visible layer group
    fn add_layer_group(&mut self, group: &str);

    /// Remove a layer group and everything drawn in it
    fn remove_layer_group(&mut self, group: &str);

    /// Show or hide a layer group without discarding its contents
    fn set_layer_visible(&mut self, group: &str, visible: bool);

    /// Draw a polyline through `path` in `color`
    fn draw_path(&mut self, group: &str, path: &[LatLng], color: Rgb);

    /// Draw a point marker with its detail payload
    fn draw_marker(&mut self, group: &str, marker: &Marker, style: &MarkerStyle);

    /// Remove the markers of a group, keeping its path
    fn clear_markers(&mut self, group: &str);

    /// Move the viewport so `bounds` is fully visible
    fn fit_bounds(&mut self, bounds: Bounds);

    /// Replace the per-beacon filter control
    fn set_filter_control(&mut self, entries: &[FilterEntry]);

    /// Remove the filter control, if any
    fn remove_filter_control(&mut self);

    /// Show a status line to the user
    fn set_status(&mut self, status: &StatusMessage);

    /// Draw a finalized beacon layer: group, then path, then markers on top
    fn render_layer(&mut self, layer: &BeaconLayer, style: &MarkerStyle) {
        self.add_layer_group(&layer.beacon_id);
        if !layer.path.is_empty() {
            self.draw_path(&layer.beacon_id, &layer.path, layer.color);
        }
        for marker in &layer.markers {
            self.draw_marker(&layer.beacon_id, marker, style);
        }
    }

    /// Replace the markers of an already rendered layer
    fn redraw_markers(&mut self, layer: &BeaconLayer, style: &MarkerStyle) {
        self.clear_markers(&layer.beacon_id);
        for marker in &layer.markers {
            self.draw_marker(&layer.beacon_id, marker, style);
        }
    }
}
