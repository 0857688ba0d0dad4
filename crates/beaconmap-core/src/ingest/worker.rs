//! Background ingestion worker
//!
//! Runs a [`BatchReader`] on the blocking pool and streams its batches over a
//! bounded channel so the consumer never parses on its own task.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{BatchReader, IngestEvent, LoadId};

/// Handle to a running ingestion worker.
///
/// Dropping the handle cancels the worker.
pub struct IngestWorker {
    load_id: LoadId,
    cancel: CancellationToken,
    events: mpsc::Receiver<IngestEvent>,
    handle: JoinHandle<()>,
}

impl IngestWorker {
    /// Start parsing `body` in batches of `batch_size` rows.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(load_id: LoadId, body: String, batch_size: usize, capacity: usize) -> Self {
        let (tx, events) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::task::spawn_blocking(move || {
            run_worker(load_id, body, batch_size, tx, token);
        });

        Self {
            load_id,
            cancel,
            events,
            handle,
        }
    }

    /// Load session this worker belongs to
    pub fn load_id(&self) -> LoadId {
        self.load_id
    }

    /// Receive the next event, or `None` once the worker has exited
    pub async fn recv(&mut self) -> Option<IngestEvent> {
        self.events.recv().await
    }

    /// Best-effort stop. Batches already queued may still be delivered.
    ///
    /// A running blocking task cannot be aborted; the worker checks the token
    /// between batches and also exits once this handle (and its receiver) is
    /// dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the worker task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for IngestWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn run_worker(
    load_id: LoadId,
    body: String,
    batch_size: usize,
    tx: mpsc::Sender<IngestEvent>,
    cancel: CancellationToken,
) {
    let reader = match BatchReader::from_string(body, batch_size) {
        Ok(reader) => reader,
        Err(e) => {
            warn!(%load_id, "session header rejected: {e}");
            let _ = tx.blocking_send(IngestEvent::failed(load_id, e.to_string()));
            return;
        }
    };

    let mut rows = 0usize;
    for batch in reader {
        if cancel.is_cancelled() {
            debug!(%load_id, rows, "ingestion cancelled");
            return;
        }

        match batch {
            Ok(batch) => {
                rows += batch.len();
                if tx.blocking_send(IngestEvent::batch(load_id, batch)).is_err() {
                    // Receiver dropped, nobody is listening any more
                    return;
                }
            }
            Err(e) => {
                warn!(%load_id, rows, "session parse failed: {e}");
                let _ = tx.blocking_send(IngestEvent::failed(load_id, e.to_string()));
                return;
            }
        }
    }

    if !cancel.is_cancelled() {
        debug!(%load_id, rows, "ingestion complete");
        let _ = tx.blocking_send(IngestEvent::complete(load_id, rows));
    }
}
