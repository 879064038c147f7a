// src/crawl/sink.rs
// =============================================================================
// Where fetch events go.
//
// Every fetch attempt produces exactly one FetchEvent, which prints as one of:
//   Fetched URL: <url>
//   Error fetching <url>: <reason>
//
// FileSink appends those lines to a log file (log.txt by default).
// MemorySink keeps them in a Vec, for tests and for programs embedding the
// crawler that want to inspect the events afterwards.
// =============================================================================

use std::fmt;
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Fetched { url: String },
    Failed { url: String, reason: String },
}

impl FetchEvent {
    pub fn url(&self) -> &str {
        match self {
            FetchEvent::Fetched { url } | FetchEvent::Failed { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchEvent::Fetched { .. })
    }
}

impl fmt::Display for FetchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchEvent::Fetched { url } => write!(f, "Fetched URL: {}", url),
            FetchEvent::Failed { url, reason } => write!(f, "Error fetching {}: {}", url, reason),
        }
    }
}

// Receives one event per fetch attempt; called from many workers at once
pub trait EventSink: Send + Sync {
    fn record(&self, event: &FetchEvent);
}

// Writes each event as a line in a file
#[derive(Debug)]
pub struct FileSink {
    writer: Mutex<LineWriter<File>>,
}

impl FileSink {
    // Creates (or truncates) the log file
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(LineWriter::new(file)),
        })
    }
}

impl EventSink for FileSink {
    fn record(&self, event: &FetchEvent) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", event) {
            // Losing a log line must not stop the crawl
            tracing::warn!(error = %e, url = event.url(), "failed to write fetch log line");
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<FetchEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    // A copy of every event recorded so far, in arrival order
    pub fn events(&self) -> Vec<FetchEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // The events as log lines
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &FetchEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
