//! JSON-backed persistence for the simulation event trace.
//!
//! Events are buffered in memory as they are recorded, stamped with a
//! wall-clock timestamp on receipt, and written out as a single top-level
//! JSON array when the writer is finished.

use folkways_core::{TraceEvent, TraceSink};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;

/// Errors raised while persisting the trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("trace writer is still shared; drop the simulation sink first")]
    StillShared,
}

/// A trace entry as persisted: the event payload plus the wall-clock
/// timestamp (milliseconds since the epoch) at which it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StampedEvent {
    pub timestamp: u64,
    #[serde(flatten)]
    pub event: TraceEvent,
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Buffered sink writing the replay trace to a JSON file.
pub struct JsonTraceWriter {
    path: PathBuf,
    events: Vec<StampedEvent>,
    clock: fn() -> u64,
}

impl std::fmt::Debug for JsonTraceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonTraceWriter")
            .field("path", &self.path)
            .field("buffered", &self.events.len())
            .finish()
    }
}

impl JsonTraceWriter {
    /// Create a writer targeting `path`. Nothing touches the filesystem
    /// until [`finish`](Self::finish).
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            events: Vec::new(),
            clock: wall_clock_ms,
        }
    }

    /// Writer with a custom clock, for deterministic stamping in tests.
    #[must_use]
    pub fn with_clock(path: impl AsRef<Path>, clock: fn() -> u64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            events: Vec::new(),
            clock,
        }
    }

    /// Events buffered so far.
    #[must_use]
    pub fn events(&self) -> &[StampedEvent] {
        &self.events
    }

    /// Target path of the trace file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the buffered events as one JSON array and return the path.
    pub fn finish(self) -> Result<PathBuf, TraceError> {
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.events)?;
        info!(
            path = %self.path.display(),
            events = self.events.len(),
            "wrote simulation trace"
        );
        Ok(self.path)
    }
}

impl TraceSink for JsonTraceWriter {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(StampedEvent {
            timestamp: (self.clock)(),
            event,
        });
    }
}

/// Shared handle to a writer owned jointly by the caller and a simulation.
pub type SharedTraceWriter = Arc<Mutex<JsonTraceWriter>>;

/// A cloneable sink that forwards events into a shared writer. Hand one
/// clone to the simulation and keep the writer handle to finish the file
/// once the run completes.
#[derive(Debug, Clone)]
pub struct SharedTraceSink(SharedTraceWriter);

impl SharedTraceSink {
    /// Wrap a writer, returning the sink and the shared writer handle.
    #[must_use]
    pub fn share(writer: JsonTraceWriter) -> (Self, SharedTraceWriter) {
        let shared = Arc::new(Mutex::new(writer));
        (Self(Arc::clone(&shared)), shared)
    }
}

impl TraceSink for SharedTraceSink {
    fn record(&mut self, event: TraceEvent) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(event);
    }
}

/// Finish a shared writer once every sink clone has been dropped.
pub fn finish_shared(shared: SharedTraceWriter) -> Result<PathBuf, TraceError> {
    match Arc::try_unwrap(shared) {
        Ok(mutex) => mutex
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .finish(),
        Err(_) => Err(TraceError::StillShared),
    }
}
