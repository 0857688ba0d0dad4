//! Session Ingestion
//!
//! Parses session bodies into telemetry records in bounded batches, either
//! inline through [`BatchReader`] or on a background worker through
//! [`IngestWorker`].

mod reader;
mod worker;

pub use reader::BatchReader;
pub use worker::IngestWorker;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::telemetry::TelemetryRecord;

/// Default number of rows per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default capacity of the worker event channel, in batches
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Identifier of one load session.
///
/// Every event a worker emits carries the id of the load that spawned it, so
/// the consumer can discard events from a load that has since been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadId(Uuid);

impl LoadId {
    /// Create a fresh, random load id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LoadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message sent from a worker to its consumer
#[derive(Debug, Clone, PartialEq)]
pub struct IngestEvent {
    /// Load session that produced the event
    pub load_id: LoadId,
    /// Payload
    pub kind: IngestEventKind,
}

/// Payload of an [`IngestEvent`]
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEventKind {
    /// A batch of parsed rows, at most the requested batch size
    Batch(Vec<TelemetryRecord>),
    /// Parsing finished; sent once after the last batch
    Complete {
        /// Total rows parsed
        rows: usize,
    },
    /// Parsing stopped on malformed input
    Failed(String),
}

impl IngestEvent {
    /// Create a batch event
    pub fn batch(load_id: LoadId, rows: Vec<TelemetryRecord>) -> Self {
        Self {
            load_id,
            kind: IngestEventKind::Batch(rows),
        }
    }

    /// Create a completion event
    pub fn complete(load_id: LoadId, rows: usize) -> Self {
        Self {
            load_id,
            kind: IngestEventKind::Complete { rows },
        }
    }

    /// Create a failure event
    pub fn failed(load_id: LoadId, message: impl Into<String>) -> Self {
        Self {
            load_id,
            kind: IngestEventKind::Failed(message.into()),
        }
    }

    /// Whether this is the last event the worker will send
    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, IngestEventKind::Batch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ids_are_unique() {
        let a = LoadId::new();
        let b = LoadId::new();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_terminal_events() {
        let id = LoadId::new();
        assert!(!IngestEvent::batch(id, Vec::new()).is_terminal());
        assert!(IngestEvent::complete(id, 0).is_terminal());
        assert!(IngestEvent::failed(id, "boom").is_terminal());
    }
}
