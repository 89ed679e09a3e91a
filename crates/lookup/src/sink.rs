//! Append-only record sinks.
//!
//! The router is the only writer of each sink, so implementations need no
//! internal locking for correctness. [`MemorySink`] shares its buffer so
//! callers can inspect records after a run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::errors::PipelineError;

/// Destination for one-line records.
#[async_trait]
pub trait RecordSink: Send {
    /// Appends one record. The sink terminates the line.
    async fn append(&mut self, record: &str) -> Result<(), PipelineError>;

    /// Flushes buffered records.
    async fn flush(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Appends records to a file, creating it if needed.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    pub async fn open_append(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        debug!("Opened sink {}", path.display());

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for FileSink {
    async fn append(&mut self, record: &str) -> Result<(), PipelineError> {
        self.writer.write_all(record.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), PipelineError> {
        self.writer
            .flush()
            .await
            .map_err(|e| PipelineError::Sink(format!("{}: {}", self.path.display(), e)))
    }
}

/// Collects records in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected records.
    pub fn records(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&mut self, record: &str) -> Result<(), PipelineError> {
        self.records
            .lock()
            .map_err(|_| PipelineError::Sink("memory sink poisoned".to_string()))?
            .push(record.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PriceList.sql");
        tokio::fs::write(&path, "existing\n").await.unwrap();

        let mut sink = FileSink::open_append(&path).await.unwrap();
        sink.append("first").await.unwrap();
        sink.append("second").await.unwrap();
        sink.flush().await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "existing\nfirst\nsecond\n");
    }

    #[tokio::test]
    async fn test_file_sink_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ErroredUPC.txt");

        let mut sink = FileSink::open_append(&path).await.unwrap();
        sink.append("222 - PROVIDER_ERROR -> NOT_FOUND").await.unwrap();
        sink.flush().await.unwrap();

        assert_eq!(sink.path(), path.as_path());
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "222 - PROVIDER_ERROR -> NOT_FOUND\n");
    }

    #[tokio::test]
    async fn test_memory_sink_shares_records() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.append("a").await.unwrap();
        writer.append("b").await.unwrap();
        assert_eq!(sink.records(), vec!["a".to_string(), "b".to_string()]);
    }
}
