//! Observability - kernel events written as JSON lines.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A kernel event for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub run_id: Option<String>,
    pub cycle: Option<u64>,
    pub message: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl KernelEvent {
    pub fn new(event_type: &str, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            run_id: None,
            cycle: None,
            message: message.into(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_run(mut self, run_id: &str, cycle: u64) -> Self {
        self.run_id = Some(run_id.to_string());
        self.cycle = Some(cycle);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Appends kernel events to a JSON-lines file.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    events_path: PathBuf,
}

impl EventEmitter {
    pub fn new(events_path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: events_path.into(),
        }
    }

    /// Emitter at the default location under a project root.
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".gatherer/events.jsonl"))
    }

    pub fn path(&self) -> &Path {
        &self.events_path
    }

    /// Appends one event as a single line. Blocking; async callers go through [`EventWriter`].
    pub fn emit(&self, event: &KernelEvent) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let dir = self.events_path.parent().filter(|d| !d.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_path)
            .and_then(|mut file| file.write_all(&line))
            .with_context(|| format!("appending to {}", self.events_path.display()))
    }

    /// Emit, logging instead of failing. The control loop never stops over a lost event.
    pub fn emit_or_warn(&self, event: &KernelEvent) {
        if let Err(e) = self.emit(event) {
            tracing::warn!(error = %e, event = %event.event_type, "failed to write kernel event");
        }
    }

    /// The last `limit` parseable events, oldest first. A missing file reads as empty.
    pub fn read_recent(&self, limit: usize) -> Vec<KernelEvent> {
        let Ok(file) = std::fs::File::open(&self.events_path) else {
            return Vec::new();
        };

        let mut tail = VecDeque::with_capacity(limit.min(256));
        for line in BufReader::new(file).lines().map_while(|l| l.ok()) {
            let Ok(event) = serde_json::from_str::<KernelEvent>(&line) else {
                continue;
            };
            if tail.len() == limit {
                tail.pop_front();
            }
            if limit > 0 {
                tail.push_back(event);
            }
        }
        tail.into()
    }

    /// Moves file writes onto a background task. Events are written in send order.
    pub fn spawn_writer(self) -> EventWriter {
        let (tx, mut rx) = mpsc::unbounded_channel::<KernelEvent>();
        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let emitter = self.clone();
                let written =
                    tokio::task::spawn_blocking(move || emitter.emit_or_warn(&event)).await;
                if let Err(e) = written {
                    tracing::warn!(error = %e, "event writer stopped");
                    break;
                }
            }
        });
        EventWriter { tx, task }
    }
}

/// Handle to the task started by [`EventEmitter::spawn_writer`].
#[derive(Debug)]
pub struct EventWriter {
    tx: mpsc::UnboundedSender<KernelEvent>,
    task: JoinHandle<()>,
}

impl EventWriter {
    /// Queues an event without waiting for the write.
    pub fn send(&self, event: KernelEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("event writer is gone, dropping event");
        }
    }

    /// Waits until every queued event is on disk.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "event writer task failed");
        }
    }
}
