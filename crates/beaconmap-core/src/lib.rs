//! # beaconmap Core Library
//!
//! Core functionality for rendering beacon telemetry traces on a map.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Chunked, cancellable parsing of session files on a background worker
//! - Grouping of telemetry records per beacon
//! - Intensity colour mapping driven by two adjustable thresholds
//! - A rendering surface abstraction with a GeoJSON implementation
//! - Session sources (local directory, HTTP, in-memory)
//!
//! ## Example
//!
//! ```rust,ignore
//! use beaconmap_core::prelude::*;
//!
//! let source = DirectorySource::new("./sessions");
//! let mut controller = MapController::new(MapConfig::default(), source, GeoJsonSurface::new());
//!
//! controller.load("session_2024_05_01.csv").await?;
//! controller.set_thresholds(Thresholds::new(300.0, 1500.0)?);
//!
//! let geojson = controller.surface().to_feature_collection();
//! ```

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod demo;
pub mod error;
pub mod ingest;
pub mod render;
pub mod source;
pub mod telemetry;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregate::{BeaconLayer, CapPolicy, MapSession, Rgb, Thresholds};
    pub use crate::config::MapConfig;
    pub use crate::controller::{LoadState, MapController};
    pub use crate::error::{FetchError, IngestError, MapError};
    pub use crate::ingest::{BatchReader, IngestEvent, IngestEventKind, IngestWorker, LoadId};
    pub use crate::render::{GeoJsonSurface, RenderSurface, StatusMessage};
    pub use crate::source::{DirectorySource, HttpSource, MemorySource, SessionSource};
    pub use crate::telemetry::TelemetryRecord;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
