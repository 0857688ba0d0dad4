//! Map configuration
//!
//! Settings stored as pretty-printed JSON. Missing fields fall back to their
//! defaults so older files keep loading.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::{
    default_palette, CapPolicy, Rgb, Thresholds, DEFAULT_MAX_POINTS_PER_BEACON,
};
use crate::error::MapError;
use crate::ingest::{DEFAULT_BATCH_SIZE, DEFAULT_CHANNEL_CAPACITY};
use crate::render::MarkerStyle;

/// Number of preamble lines before the CSV header in a session file
pub const DEFAULT_HEADER_LINES: usize = 2;

/// Full configuration for loading and drawing sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Config version for migrations
    pub version: String,

    /// Parsing settings
    pub ingest: IngestSettings,

    /// Drawing settings
    pub display: DisplaySettings,

    /// Directory holding session files (defaults to the user data directory)
    pub sessions_dir: Option<PathBuf>,
}

/// Settings for the ingestion worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Rows per batch sent from the worker
    pub chunk_size: usize,

    /// Preamble lines dropped before parsing
    pub header_lines: usize,

    /// Batches buffered between worker and consumer
    pub channel_capacity: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_BATCH_SIZE,
            header_lines: DEFAULT_HEADER_LINES,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Settings for the aggregator and the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Point budget per beacon
    pub max_points_per_beacon: usize,

    /// How the budget is enforced
    pub cap_policy: CapPolicy,

    /// Base colours assigned by beacon order
    pub palette: Vec<Rgb>,

    /// Initial intensity thresholds
    pub thresholds: Thresholds,

    /// Marker appearance
    pub marker: MarkerStyle,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_points_per_beacon: DEFAULT_MAX_POINTS_PER_BEACON,
            cap_policy: CapPolicy::default(),
            palette: default_palette(),
            thresholds: Thresholds::default(),
            marker: MarkerStyle::default(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            ingest: IngestSettings::default(),
            display: DisplaySettings::default(),
            sessions_dir: None,
        }
    }
}

impl MapConfig {
    /// Load a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| MapError::Config(format!("Failed to read config file: {}", e)))?;
        let config: MapConfig = serde_json::from_str(&content)
            .map_err(|e| MapError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a config file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MapError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MapError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path.as_ref(), content)
            .map_err(|e| MapError::Config(format!("Failed to write config file: {}", e)))
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<(), MapError> {
        if self.ingest.chunk_size == 0 {
            return Err(MapError::Config("chunk_size must be at least 1".to_string()));
        }
        if self.display.max_points_per_beacon == 0 {
            return Err(MapError::Config(
                "max_points_per_beacon must be at least 1".to_string(),
            ));
        }
        if self.display.palette.is_empty() {
            return Err(MapError::Config("palette must not be empty".to_string()));
        }
        Ok(())
    }

    /// Directory holding session files
    pub fn sessions_dir(&self) -> PathBuf {
        self.sessions_dir.clone().unwrap_or_else(default_sessions_dir)
    }
}

/// Default session directory (cross-platform)
pub fn default_sessions_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("beaconmap")
        .join("sessions")
}
