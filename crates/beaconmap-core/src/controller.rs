//! Map controller
//!
//! Owns one load at a time: fetches the session, drives the ingestion worker,
//! feeds the aggregator and pushes the result to the rendering surface.
//!
//! ```text
//! Idle -> Fetching -> Ingesting (batch)* -> Finalized
//!                  \-> Failed   \-> Failed
//! ```
//!
//! Starting a new load from any state cancels the running worker and clears
//! everything the previous load drew.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{MapSession, Thresholds};
use crate::config::MapConfig;
use crate::error::MapError;
use crate::ingest::{IngestEvent, IngestEventKind, IngestWorker, LoadId};
use crate::render::{RenderSurface, StatusMessage};
use crate::source::SessionSource;
use crate::telemetry::strip_header_lines;

/// Where the current load stands
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing loaded
    Idle,
    /// Waiting for the session source
    Fetching {
        /// Load being fetched
        load_id: LoadId,
        /// Requested session name
        name: String,
    },
    /// Worker is parsing, batches are arriving
    Ingesting {
        /// Load being parsed
        load_id: LoadId,
        /// Batches received so far
        batches: usize,
        /// Rows received so far
        rows: usize,
    },
    /// All batches received and drawn
    Finalized {
        /// Load that was drawn
        load_id: LoadId,
        /// Number of beacons
        beacons: usize,
        /// Rows stored across all beacons
        rows: usize,
    },
    /// Fetch or parse failed; the load is over
    Failed {
        /// Load that failed
        load_id: LoadId,
        /// Status text reported to the user
        message: String,
    },
}

impl LoadState {
    /// Load the state refers to, if any
    pub fn load_id(&self) -> Option<LoadId> {
        match self {
            LoadState::Idle => None,
            LoadState::Fetching { load_id, .. }
            | LoadState::Ingesting { load_id, .. }
            | LoadState::Finalized { load_id, .. }
            | LoadState::Failed { load_id, .. } => Some(*load_id),
        }
    }

    /// Whether no further events are expected
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            LoadState::Idle | LoadState::Finalized { .. } | LoadState::Failed { .. }
        )
    }
}

/// Drives loads from a [`SessionSource`] onto a [`RenderSurface`]
pub struct MapController<S: SessionSource, R: RenderSurface> {
    config: MapConfig,
    source: S,
    surface: R,
    thresholds: Thresholds,
    state: LoadState,
    session: Option<MapSession>,
    worker: Option<IngestWorker>,
    /// Layer groups this controller added to the surface
    rendered_groups: Vec<String>,
}

impl<S: SessionSource, R: RenderSurface> MapController<S, R> {
    /// Create an idle controller
    pub fn new(config: MapConfig, source: S, surface: R) -> Self {
        let thresholds = config.display.thresholds;
        Self {
            config,
            source,
            surface,
            thresholds,
            state: LoadState::Idle,
            session: None,
            worker: None,
            rendered_groups: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Data of the current load
    pub fn session(&self) -> Option<&MapSession> {
        self.session.as_ref()
    }

    /// Rendering surface
    pub fn surface(&self) -> &R {
        &self.surface
    }

    /// Rendering surface, mutable
    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    /// Consume the controller, keeping the surface
    pub fn into_surface(self) -> R {
        let Self {
            surface, worker, ..
        } = self;
        if let Some(worker) = worker {
            worker.cancel();
        }
        surface
    }

    /// Active configuration
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Current intensity thresholds
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Whether an ingestion worker is attached
    pub fn has_active_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Start loading `name`: cancel the previous load, reset state, fetch the
    /// session and spawn the worker.
    ///
    /// An empty name is ignored and returns `Ok(None)`.
    pub async fn begin_load(&mut self, name: &str) -> Result<Option<LoadId>, MapError> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        self.clear();

        let load_id = LoadId::new();
        info!(%load_id, name, "loading session");

        let display = &self.config.display;
        self.session = Some(MapSession::new(
            load_id,
            display.cap_policy,
            display.max_points_per_beacon,
        ));
        self.state = LoadState::Fetching {
            load_id,
            name: name.to_string(),
        };
        self.surface.set_status(&StatusMessage::Loading);

        let text = match self.source.fetch(name).await {
            Ok(text) => text,
            Err(e) => {
                warn!(%load_id, name, "session fetch failed: {e}");
                self.fail(load_id, StatusMessage::FetchFailed(e.to_string()));
                return Err(e.into());
            }
        };

        let ingest = &self.config.ingest;
        let body = strip_header_lines(&text, ingest.header_lines).to_string();
        self.worker = Some(IngestWorker::spawn(
            load_id,
            body,
            ingest.chunk_size,
            ingest.channel_capacity,
        ));
        self.state = LoadState::Ingesting {
            load_id,
            batches: 0,
            rows: 0,
        };

        Ok(Some(load_id))
    }

    /// Apply one worker event. Returns `false` if it was stale and ignored.
    pub fn handle_event(&mut self, event: IngestEvent) -> bool {
        let current = match &self.state {
            LoadState::Ingesting { load_id, .. } => *load_id,
            _ => {
                debug!(load_id = %event.load_id, "dropping event, no load is ingesting");
                return false;
            }
        };
        if event.load_id != current {
            debug!(load_id = %event.load_id, %current, "dropping stale event");
            return false;
        }

        match event.kind {
            IngestEventKind::Batch(rows) => {
                let count = rows.len();
                if let Some(session) = self.session.as_mut() {
                    session.ingest_batch(rows);
                }
                if let LoadState::Ingesting { batches, rows, .. } = &mut self.state {
                    *batches += 1;
                    *rows += count;
                    debug!(load_id = %current, batch = *batches, rows = count, "batch received");
                }
            }
            IngestEventKind::Complete { rows } => {
                debug!(load_id = %current, rows, "worker finished");
                self.worker = None;
                self.finalize();
            }
            IngestEventKind::Failed(message) => {
                warn!(load_id = %current, "session parse failed: {message}");
                self.worker = None;
                self.fail(current, StatusMessage::ParseFailed(message));
            }
        }
        true
    }

    /// Receive the next event from the active worker
    pub async fn next_event(&mut self) -> Option<IngestEvent> {
        match self.worker.as_mut() {
            Some(worker) => worker.recv().await,
            None => None,
        }
    }

    /// Pump worker events until the load is finalized or failed
    pub async fn run_until_settled(&mut self) -> Result<&LoadState, MapError> {
        while let LoadState::Ingesting { load_id, .. } = self.state {
            match self.next_event().await {
                Some(event) => {
                    self.handle_event(event);
                }
                None => {
                    warn!(%load_id, "ingestion worker exited without completing");
                    self.worker = None;
                    self.fail(
                        load_id,
                        StatusMessage::ParseFailed(MapError::WorkerGone.to_string()),
                    );
                    return Err(MapError::WorkerGone);
                }
            }
        }

        match &self.state {
            LoadState::Failed { message, .. } => Err(MapError::Ingest(message.clone())),
            state => Ok(state),
        }
    }

    /// Load `name` to completion
    pub async fn load(&mut self, name: &str) -> Result<LoadState, MapError> {
        if self.begin_load(name).await?.is_none() {
            return Ok(self.state.clone());
        }
        self.run_until_settled().await.cloned()
    }

    /// Cancel any load and remove everything drawn
    pub fn teardown(&mut self) {
        self.clear();
        self.state = LoadState::Idle;
    }

    /// Replace both thresholds and recolour the drawn markers
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
        self.recolor();
    }

    /// Change the lower threshold; rejected values leave everything untouched
    pub fn set_low(&mut self, low: f64) -> Result<(), MapError> {
        let thresholds = self.thresholds.with_low(low)?;
        self.set_thresholds(thresholds);
        Ok(())
    }

    /// Change the upper threshold; rejected values leave everything untouched
    pub fn set_high(&mut self, high: f64) -> Result<(), MapError> {
        let thresholds = self.thresholds.with_high(high)?;
        self.set_thresholds(thresholds);
        Ok(())
    }

    /// Whether a beacon is shown
    pub fn is_visible(&self, beacon_id: &str) -> Option<bool> {
        self.session.as_ref()?.is_visible(beacon_id)
    }

    /// Show or hide one beacon
    pub fn set_visible(&mut self, beacon_id: &str, visible: bool) -> Result<(), MapError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| MapError::UnknownBeacon(beacon_id.to_string()))?;
        session.set_visible(beacon_id, visible)?;
        self.surface.set_layer_visible(beacon_id, visible);
        self.refresh_filter_control();
        Ok(())
    }

    /// Show every beacon
    pub fn show_all(&mut self) {
        self.set_all_visible(|_| true);
    }

    /// Hide every beacon
    pub fn hide_all(&mut self) {
        self.set_all_visible(|_| false);
    }

    /// Flip the visibility of every beacon
    pub fn invert_selection(&mut self) {
        self.set_all_visible(|visible| !visible);
    }

    fn set_all_visible(&mut self, next: impl Fn(bool) -> bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let ids: Vec<String> = session.beacon_ids().map(str::to_string).collect();
        for id in ids {
            let visible = next(session.is_visible(&id).unwrap_or(true));
            if session.set_visible(&id, visible).is_ok() {
                self.surface.set_layer_visible(&id, visible);
            }
        }
        self.refresh_filter_control();
    }

    fn refresh_filter_control(&mut self) {
        if !matches!(self.state, LoadState::Finalized { .. }) {
            return;
        }
        if let Some(session) = self.session.as_ref() {
            let entries = session.filter_entries(&self.config.display.palette);
            self.surface.set_filter_control(&entries);
        }
    }

    fn recolor(&mut self) {
        if !matches!(self.state, LoadState::Finalized { .. }) {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.recolor(&self.thresholds);
        for layer in session.layers() {
            self.surface.redraw_markers(layer, &self.config.display.marker);
        }
        debug!(
            low = self.thresholds.low(),
            high = self.thresholds.high(),
            "markers recoloured"
        );
    }

    fn finalize(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let display = &self.config.display;

        session.finalize(&display.palette, &self.thresholds);
        for layer in session.layers() {
            self.surface.render_layer(layer, &display.marker);
            self.rendered_groups.push(layer.beacon_id.clone());
            if session.is_visible(&layer.beacon_id) == Some(false) {
                self.surface.set_layer_visible(&layer.beacon_id, false);
            }
        }

        if let Some(bounds) = session.initial_view() {
            self.surface.fit_bounds(bounds);
        }
        self.surface
            .set_filter_control(&session.filter_entries(&display.palette));

        let status = if session.is_limited() {
            StatusMessage::LoadedLimited {
                max_points: display.max_points_per_beacon,
            }
        } else {
            StatusMessage::Loaded
        };
        self.surface.set_status(&status);

        let load_id = session.load_id();
        let beacons = session.beacon_count();
        let rows = session.all_series().iter().map(|s| s.records.len()).sum();
        info!(%load_id, beacons, rows, "session loaded");

        self.state = LoadState::Finalized {
            load_id,
            beacons,
            rows,
        };
    }

    fn fail(&mut self, load_id: LoadId, status: StatusMessage) {
        self.surface.set_status(&status);
        self.state = LoadState::Failed {
            load_id,
            message: status.to_string(),
        };
    }

    fn cancel_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            debug!(load_id = %worker.load_id(), "cancelling ingestion worker");
            worker.cancel();
        }
    }

    fn clear(&mut self) {
        self.cancel_worker();
        for group in self.rendered_groups.drain(..) {
            self.surface.remove_layer_group(&group);
        }
        self.surface.remove_filter_control();
        self.session = None;
    }
}
