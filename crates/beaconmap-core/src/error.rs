//! Error types

use thiserror::Error;

/// Errors that can occur while fetching a session resource
#[derive(Error, Debug)]
pub enum FetchError {
    /// Local read failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No session with that name
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Name is empty or could escape the source
    #[error("Invalid session name: '{0}'")]
    InvalidName(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP error! status: {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Request could not be completed
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors that can occur while parsing a session body
#[derive(Error, Debug)]
pub enum IngestError {
    /// Malformed CSV, including rows with the wrong field count
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Header lacks a required column
    #[error("Missing required column: '{0}'")]
    MissingColumn(String),
}

/// Top-level errors surfaced by the map controller
#[derive(Error, Debug)]
pub enum MapError {
    /// Session could not be fetched
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Session could not be parsed
    #[error("Parse failed: {0}")]
    Ingest(String),

    /// Threshold pair is not finite or not ordered
    #[error("Invalid thresholds: low={low}, high={high} (low must be below high)")]
    InvalidThresholds {
        /// Rejected lower threshold
        low: f64,
        /// Rejected upper threshold
        high: f64,
    },

    /// No beacon with that id in the current load
    #[error("Unknown beacon: {0}")]
    UnknownBeacon(String),

    /// Worker exited before sending a terminal event
    #[error("Ingestion worker stopped without completing")]
    WorkerGone,

    /// Config file could not be read, parsed or validated
    #[error("Config error: {0}")]
    Config(String),
}
