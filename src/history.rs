//! Result history.
//!
//! Scored attempts are handed to a [`ResultSink`] after the player has their
//! result. Sink failures are logged by the caller and never change what the
//! player sees.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to write history: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode history entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One scored attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub identity: String,
    pub quiz: String,
    pub score: usize,
    pub total: usize,
    pub elapsed_seconds: Option<u64>,
    /// Seconds since the Unix epoch.
    pub recorded_at: u64,
}

impl ResultRecord {
    pub fn new(
        identity: impl Into<String>,
        quiz: impl Into<String>,
        score: usize,
        total: usize,
        elapsed_seconds: Option<u64>,
    ) -> Self {
        let recorded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            identity: identity.into(),
            quiz: quiz.into(),
            score,
            total,
            elapsed_seconds,
            recorded_at,
        }
    }
}

pub trait ResultSink: Send + Sync {
    fn record(&self, record: &ResultRecord) -> Result<(), HistoryError>;
}

/// Appends one JSON object per line to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesHistory {
    path: PathBuf,
}

impl JsonLinesHistory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonLinesHistory {
    fn record(&self, record: &ResultRecord) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // Single write so concurrent appends do not interleave within a line.
        file.write_all(line.as_bytes())?;

        Ok(())
    }
}
