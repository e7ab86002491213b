//! Run journal for stint.
//!
//! An optional append-only NDJSON log (one JSON object per line) recording
//! the lifecycle of a benchmark run: run start/finish, every recorded
//! invocation, and the outcome of periodic maintenance commands. Nothing in
//! the measurement pipeline depends on the journal, but a failure to write
//! it is still fatal, like any other write failure.

use crate::error::{HarnessError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Actions recorded in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// The run began: file/configuration/repetition counts.
    RunStarted,
    /// One benchmarked invocation was recorded.
    Invocation,
    /// A periodic maintenance command finished (or failed to start).
    Periodic,
    /// The run completed: final counters.
    RunFinished,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::RunStarted => write!(f, "run_started"),
            EventAction::Invocation => write!(f, "invocation"),
            EventAction::Periodic => write!(f, "periodic"),
            EventAction::RunFinished => write!(f, "run_finished"),
        }
    }
}

/// One journal record, serialized as a single NDJSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was recorded.
    pub action: EventAction,

    /// Who ran the harness (`user@host`).
    pub actor: String,

    /// Freeform action-specific details.
    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| HarnessError::Write(format!("failed to serialize journal event: {}", e)))
    }
}

/// Get the actor string for journal metadata.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append-only handle on the journal file.
///
/// Each append writes one line and flushes it, so a tailing observer sees
/// events as they happen.
#[derive(Debug)]
pub struct RunJournal {
    path: PathBuf,
    file: File,
}

impl RunJournal {
    /// Open (or create) the journal at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    HarnessError::Write(format!(
                        "failed to create journal directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                HarnessError::Write(format!(
                    "failed to open journal '{}': {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Append one event as a single NDJSON line.
    pub fn append(&mut self, event: &Event) -> Result<()> {
        let line = event.to_ndjson_line()?;
        writeln!(self.file, "{}", line).map_err(|e| {
            HarnessError::Write(format!(
                "failed to write journal '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        self.file.flush().map_err(|e| {
            HarnessError::Write(format!(
                "failed to flush journal '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}
