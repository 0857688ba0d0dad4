//! Per-load beacon state
//!
//! A [`MapSession`] owns everything one load produces: the stored series per
//! beacon, the visibility filter and the finalized layers. A new load gets a
//! fresh session; nothing is shared between loads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::color::palette_color;
use super::path::downsample;
use super::{Rgb, Thresholds};
use crate::error::MapError;
use crate::ingest::LoadId;
use crate::render::{Bounds, FilterEntry, LatLng, Marker, MarkerDetail};
use crate::telemetry::TelemetryRecord;

/// What happens once a beacon has `max_points_per_beacon` records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapPolicy {
    /// Stop storing further records for that beacon
    DropNew,
    /// Store every record, draw a strided subset
    #[default]
    Downsample,
}

/// Stored records of one beacon, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconSeries {
    /// Beacon the records belong to
    pub beacon_id: String,
    /// Every stored record, valid or not
    pub records: Vec<TelemetryRecord>,
}

/// What gets drawn for one beacon after finalize
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconLayer {
    /// Beacon, also the layer group name
    pub beacon_id: String,
    /// Base colour from the palette
    pub color: Rgb,
    /// Simplified path through the valid points
    pub path: Vec<LatLng>,
    /// One marker per path vertex
    pub markers: Vec<Marker>,
}

impl BeaconLayer {
    /// Bounds of the simplified path
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.path)
    }

    /// Recompute marker fills for new thresholds
    pub fn recolor(&mut self, thresholds: &Thresholds) {
        for marker in &mut self.markers {
            marker.fill = thresholds.shade(self.color, marker.detail.data);
        }
    }
}

/// Beacon data accumulated by one load
#[derive(Debug, Clone)]
pub struct MapSession {
    load_id: LoadId,
    cap_policy: CapPolicy,
    max_points: usize,
    series: Vec<BeaconSeries>,
    /// beacon id -> position in `series`
    index: HashMap<String, usize>,
    filters: HashMap<String, bool>,
    layers: Vec<BeaconLayer>,
    rows_received: usize,
    rows_dropped: usize,
    batches: usize,
}

impl MapSession {
    /// Create an empty session for one load
    pub fn new(load_id: LoadId, cap_policy: CapPolicy, max_points: usize) -> Self {
        Self {
            load_id,
            cap_policy,
            max_points,
            series: Vec::new(),
            index: HashMap::new(),
            filters: HashMap::new(),
            layers: Vec::new(),
            rows_received: 0,
            rows_dropped: 0,
            batches: 0,
        }
    }

    /// Load this session belongs to
    pub fn load_id(&self) -> LoadId {
        self.load_id
    }

    /// Add one batch of rows, grouping by beacon in arrival order
    pub fn ingest_batch(&mut self, rows: Vec<TelemetryRecord>) {
        self.batches += 1;
        for row in rows {
            self.rows_received += 1;

            let idx = match self.index.get(&row.beacon_id) {
                Some(&idx) => idx,
                None => {
                    let idx = self.series.len();
                    self.index.insert(row.beacon_id.clone(), idx);
                    self.filters.insert(row.beacon_id.clone(), true);
                    self.series.push(BeaconSeries {
                        beacon_id: row.beacon_id.clone(),
                        records: Vec::new(),
                    });
                    idx
                }
            };

            let series = &mut self.series[idx];
            if self.cap_policy == CapPolicy::DropNew
                && self.max_points > 0
                && series.records.len() >= self.max_points
            {
                self.rows_dropped += 1;
                continue;
            }
            series.records.push(row);
        }
    }

    /// Build the drawable layers for every beacon.
    ///
    /// Invalid points are skipped but stay in the stored series.
    pub fn finalize(&mut self, palette: &[Rgb], thresholds: &Thresholds) -> &[BeaconLayer] {
        self.layers = self
            .series
            .iter()
            .enumerate()
            .map(|(index, series)| {
                let color = palette_color(palette, index);
                let valid: Vec<&TelemetryRecord> =
                    series.records.iter().filter(|r| r.is_located()).collect();
                let shown = downsample(&valid, self.max_points);

                BeaconLayer {
                    beacon_id: series.beacon_id.clone(),
                    color,
                    path: shown.iter().map(|r| r.lat_lng()).collect(),
                    markers: shown
                        .iter()
                        .map(|r| Marker {
                            position: r.lat_lng(),
                            fill: thresholds.shade(color, r.data),
                            detail: MarkerDetail::from(*r),
                        })
                        .collect(),
                }
            })
            .collect();
        &self.layers
    }

    /// Recompute marker colours of the finalized layers. Idempotent.
    pub fn recolor(&mut self, thresholds: &Thresholds) {
        for layer in &mut self.layers {
            layer.recolor(thresholds);
        }
    }

    /// Finalized layers (empty before [`finalize`](Self::finalize))
    pub fn layers(&self) -> &[BeaconLayer] {
        &self.layers
    }

    /// Layer of one beacon
    pub fn layer(&self, beacon_id: &str) -> Option<&BeaconLayer> {
        self.layers.iter().find(|l| l.beacon_id == beacon_id)
    }

    /// Bounds of the first beacon with a non-empty path
    pub fn initial_view(&self) -> Option<Bounds> {
        self.layers.iter().find_map(|l| l.bounds())
    }

    /// Beacon ids in order of first appearance
    pub fn beacon_ids(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.beacon_id.as_str())
    }

    /// Number of beacons seen
    pub fn beacon_count(&self) -> usize {
        self.series.len()
    }

    /// Stored records of one beacon
    pub fn series(&self, beacon_id: &str) -> Option<&[TelemetryRecord]> {
        self.index
            .get(beacon_id)
            .map(|&idx| self.series[idx].records.as_slice())
    }

    /// All stored series in order of first appearance
    pub fn all_series(&self) -> &[BeaconSeries] {
        &self.series
    }

    /// Whether a beacon's layer is shown
    pub fn is_visible(&self, beacon_id: &str) -> Option<bool> {
        self.filters.get(beacon_id).copied()
    }

    /// Set a beacon's visibility
    pub fn set_visible(&mut self, beacon_id: &str, visible: bool) -> Result<(), MapError> {
        match self.filters.get_mut(beacon_id) {
            Some(flag) => {
                *flag = visible;
                Ok(())
            }
            None => Err(MapError::UnknownBeacon(beacon_id.to_string())),
        }
    }

    /// Entries for the filter control, in order of first appearance
    pub fn filter_entries(&self, palette: &[Rgb]) -> Vec<FilterEntry> {
        self.series
            .iter()
            .enumerate()
            .map(|(index, s)| FilterEntry {
                beacon_id: s.beacon_id.clone(),
                color: palette_color(palette, index),
                checked: self.filters.get(&s.beacon_id).copied().unwrap_or(true),
            })
            .collect()
    }

    /// Whether any beacon holds more records than the point budget
    /// (or, with [`CapPolicy::DropNew`], had records dropped)
    pub fn is_limited(&self) -> bool {
        self.rows_dropped > 0
            || (self.max_points > 0
                && self.series.iter().any(|s| s.records.len() > self.max_points))
    }

    /// Rows received from the worker, including dropped ones
    pub fn rows_received(&self) -> usize {
        self.rows_received
    }

    /// Rows dropped by [`CapPolicy::DropNew`]
    pub fn rows_dropped(&self) -> usize {
        self.rows_dropped
    }

    /// Batches received
    pub fn batches(&self) -> usize {
        self.batches
    }
}
