//! Batched CSV reader
//!
//! Turns a session body into a lazy sequence of record batches.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::{Cursor, Read};

use crate::error::IngestError;
use crate::telemetry::{
    coerce_number, TelemetryRecord, COL_AZIMUTH, COL_BEACON_ID, COL_DATA, COL_LATITUDE,
    COL_LONGITUDE, COL_TIMESTAMP, REQUIRED_COLUMNS,
};

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    beacon_id: usize,
    latitude: usize,
    longitude: usize,
    timestamp: Option<usize>,
    data: Option<usize>,
    azimuth: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self, IngestError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        for name in REQUIRED_COLUMNS {
            if find(name).is_none() {
                return Err(IngestError::MissingColumn(name.to_string()));
            }
        }

        Ok(Self {
            beacon_id: find(COL_BEACON_ID).unwrap_or_default(),
            latitude: find(COL_LATITUDE).unwrap_or_default(),
            longitude: find(COL_LONGITUDE).unwrap_or_default(),
            timestamp: find(COL_TIMESTAMP),
            data: find(COL_DATA),
            azimuth: find(COL_AZIMUTH),
        })
    }

    fn record(&self, row: &StringRecord) -> TelemetryRecord {
        let field = |idx: usize| row.get(idx).unwrap_or("");
        let number = |idx: Option<usize>| idx.map(|i| coerce_number(field(i))).unwrap_or(f64::NAN);

        TelemetryRecord {
            beacon_id: field(self.beacon_id).to_string(),
            localized_timestamp: self.timestamp.map(|i| field(i).to_string()).unwrap_or_default(),
            latitude: coerce_number(field(self.latitude)),
            longitude: coerce_number(field(self.longitude)),
            data: number(self.data),
            azimuth: number(self.azimuth),
        }
    }
}

/// Lazy, finite iterator of record batches.
///
/// Each item holds at most `batch_size` rows. The reader is consumed as it
/// goes and cannot be restarted; after the first error it yields nothing.
pub struct BatchReader<R: Read> {
    reader: csv::Reader<R>,
    columns: Option<ColumnMap>,
    batch_size: usize,
    rows_read: usize,
    done: bool,
}

impl BatchReader<Cursor<Vec<u8>>> {
    /// Create a reader over an owned session body (header lines already stripped)
    pub fn from_string(body: String, batch_size: usize) -> Result<Self, IngestError> {
        Self::new(Cursor::new(body.into_bytes()), batch_size)
    }
}

impl<R: Read> BatchReader<R> {
    /// Create a reader, validating the header row.
    ///
    /// An empty body is not an error and yields no batches.
    pub fn new(input: R, batch_size: usize) -> Result<Self, IngestError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(false)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let columns = if headers.is_empty() {
            None
        } else {
            Some(ColumnMap::resolve(&headers)?)
        };

        Ok(Self {
            reader,
            done: columns.is_none(),
            columns,
            batch_size: batch_size.max(1),
            rows_read: 0,
        })
    }

    /// Rows produced so far
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Maximum rows per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<R: Read> Iterator for BatchReader<R> {
    type Item = Result<Vec<TelemetryRecord>, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let columns = self.columns?;

        let mut batch = Vec::with_capacity(self.batch_size);
        let mut row = StringRecord::new();

        while batch.len() < self.batch_size {
            match self.reader.read_record(&mut row) {
                Ok(true) => batch.push(columns.record(&row)),
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }

        if batch.is_empty() {
            return None;
        }
        self.rows_read += batch.len();
        Some(Ok(batch))
    }
}
