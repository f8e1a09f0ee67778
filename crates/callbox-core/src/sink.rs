//! Durable log sinks for received callbacks.
//!
//! A sink gets every record immediately after the store append commits, as
//! one JSON line. Sink failures are surfaced to the caller as [`Error::Sink`]
//! and the ingestion handler treats them as non-fatal: the in-memory store
//! remains the source of truth.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::CallbackRecord;

/// Destination for accepted callback records.
///
/// Implementations must serialize concurrent appends themselves; callers may
/// invoke `append` from any number of request handlers at once.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Writes one record to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sink`] when the write fails. Callers decide whether
    /// that is fatal; the ingestion path logs and continues.
    async fn append(&self, record: &CallbackRecord) -> Result<()>;
}

/// Append-only NDJSON file sink: one complete record per line.
///
/// The file is opened once in append mode and shared behind a lock, so a
/// record's line and trailing newline are never interleaved with another
/// append. Lines match the store's serialized records field-for-field.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    file: Mutex<tokio::fs::File>,
}

impl JsonlSink {
    /// Opens (creating if needed) the log file at `path` for appending.
    ///
    /// Missing parent directories are created first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sink`] if the directory or file cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::sink_with_source(
                        format!("failed to create log directory {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                Error::sink_with_source(
                    format!("failed to open log file {}", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for JsonlSink {
    async fn append(&self, record: &CallbackRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| Error::sink_with_source("failed to write log line", e))?;
        file.write_all(b"\n")
            .await
            .map_err(|e| Error::sink_with_source("failed to write log line", e))?;
        file.flush()
            .await
            .map_err(|e| Error::sink_with_source("failed to flush log file", e))?;
        Ok(())
    }
}

/// In-memory sink that captures serialized lines for assertions.
///
/// Use this in tests to verify what would have been written to disk.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: std::sync::Mutex<Vec<String>>,
}

impl MemorySink {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all captured lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Returns the number of captured lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns true if no lines have been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&self, record: &CallbackRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(line);
        }
        Ok(())
    }
}

/// Sink that fails every append.
///
/// Use this in tests to verify that ingestion stays available when the
/// durable log is down.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

#[async_trait]
impl RecordSink for FailingSink {
    async fn append(&self, _record: &CallbackRecord) -> Result<()> {
        Err(Error::sink("sink unavailable"))
    }
}
