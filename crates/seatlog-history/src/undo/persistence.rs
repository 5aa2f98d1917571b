#![forbid(unsafe_code)]

//! Snapshot persistence for both history stacks.
//!
//! ```text
//! {
//!   "undo_stack": [ { "type": "MoveItemsCommand", "timestamp": "...", "data": {...} }, ... ],
//!   "redo_stack": [ ... ]
//! }
//! ```
//!
//! Both stacks are written oldest (bottom) first. Loading is tolerant: each
//! entry is decoded, age-checked and reconstructed on its own, so one bad
//! entry never costs the rest of the history, and a corrupt snapshot loads as
//! empty history.

use std::fmt;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use seatlog_core::SharedStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::command::{CommandError, CommandKind, UndoableCmd};
use super::history::HistoryManager;
use super::registry;
use crate::config::HistoryConfig;

/// Error writing a snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not serialize {kind}: {source}")]
    Payload {
        kind: CommandKind,
        #[source]
        source: CommandError,
    },
}

/// One persisted command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl PersistedEntry {
    fn from_command(cmd: &dyn UndoableCmd) -> Result<Self, PersistError> {
        let kind = cmd.kind();
        let data = cmd
            .payload()
            .map_err(|source| PersistError::Payload { kind, source })?;
        Ok(Self {
            kind: kind.tag().to_string(),
            timestamp: cmd.metadata().timestamp,
            data,
        })
    }
}

/// Serialized form of both stacks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(default)]
    pub undo_stack: Vec<PersistedEntry>,
    #[serde(default)]
    pub redo_stack: Vec<PersistedEntry>,
}

impl HistorySnapshot {
    /// Serialize every command currently held by `history`.
    pub fn capture(history: &HistoryManager) -> Result<Self, PersistError> {
        Ok(Self {
            undo_stack: history
                .undo_commands()
                .map(PersistedEntry::from_command)
                .collect::<Result<_, _>>()?,
            redo_stack: history
                .redo_commands()
                .map(PersistedEntry::from_command)
                .collect::<Result<_, _>>()?,
        })
    }

    /// As a JSON value, for embedding in the host's own data file.
    pub fn to_value(&self) -> Result<Value, PersistError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to `path` through a sibling temp file and a rename, so a crash
    /// mid-write leaves the previous snapshot intact.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        debug!(
            target: "seatlog.persist",
            path = %path.display(),
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "history snapshot saved"
        );
        Ok(())
    }
}

/// Which stack a persisted entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSide {
    Undo,
    Redo,
}

impl fmt::Display for StackSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undo => "undo_stack",
            Self::Redo => "redo_stack",
        })
    }
}

/// An entry left out of a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub stack: StackSide,
    /// Oldest-first position within its stack in the snapshot.
    pub position: usize,
    pub reason: String,
}

/// Result of loading a snapshot.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub undo: Vec<Box<dyn UndoableCmd>>,
    pub redo: Vec<Box<dyn UndoableCmd>>,
    /// Entries dropped for being older than the retention window.
    pub pruned: usize,
    /// Entries dropped for an unknown kind or a malformed payload.
    pub skipped: Vec<SkippedEntry>,
}

/// Rebuilds history stacks from snapshots against one store.
#[derive(Debug, Clone)]
pub struct HistoryLoader<'a> {
    store: &'a SharedStore,
    config: &'a HistoryConfig,
    now: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    undo_stack: Vec<Value>,
    #[serde(default)]
    redo_stack: Vec<Value>,
}

impl<'a> HistoryLoader<'a> {
    #[must_use]
    pub fn new(store: &'a SharedStore, config: &'a HistoryConfig) -> Self {
        Self {
            store,
            config,
            now: Utc::now(),
        }
    }

    /// Measure entry age against `now` instead of the wall clock.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Load from a file. A missing file is an empty history; an unreadable
    /// one is treated like a corrupt snapshot.
    #[must_use]
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> LoadReport {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => self.load_from_str(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(target: "seatlog.persist", path = %path.display(), "no history snapshot");
                LoadReport::default()
            }
            Err(e) => {
                warn!(
                    target: "seatlog.persist",
                    path = %path.display(),
                    reason = %e,
                    "history snapshot unreadable; starting with empty history"
                );
                LoadReport::default()
            }
        }
    }

    #[must_use]
    pub fn load_from_str(&self, s: &str) -> LoadReport {
        match serde_json::from_str::<Value>(s) {
            Ok(value) => self.load_from_value(value),
            Err(e) => {
                warn!(
                    target: "seatlog.persist",
                    reason = %e,
                    "history snapshot corrupt; starting with empty history"
                );
                LoadReport::default()
            }
        }
    }

    #[must_use]
    pub fn load_from_value(&self, value: Value) -> LoadReport {
        let raw: RawSnapshot = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    target: "seatlog.persist",
                    reason = %e,
                    "history snapshot corrupt; starting with empty history"
                );
                return LoadReport::default();
            }
        };

        let mut report = LoadReport::default();
        let undo = self.load_stack(StackSide::Undo, raw.undo_stack, &mut report);
        let redo = self.load_stack(StackSide::Redo, raw.redo_stack, &mut report);
        report.undo = undo;
        report.redo = redo;
        info!(
            target: "seatlog.persist",
            undo_depth = report.undo.len(),
            redo_depth = report.redo.len(),
            pruned = report.pruned,
            skipped = report.skipped.len(),
            "history loaded"
        );
        report
    }

    fn load_stack(
        &self,
        stack: StackSide,
        entries: Vec<Value>,
        report: &mut LoadReport,
    ) -> Vec<Box<dyn UndoableCmd>> {
        // A window reaching past the calendar's start keeps everything.
        let cutoff = self
            .now
            .checked_sub_signed(self.config.retention())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut commands = Vec::with_capacity(entries.len());
        for (position, raw) in entries.into_iter().enumerate() {
            let entry = match serde_json::from_value::<PersistedEntry>(raw) {
                Ok(entry) => entry,
                Err(e) => {
                    self.skip(report, stack, position, format!("malformed entry: {e}"));
                    continue;
                }
            };
            if entry.timestamp < cutoff {
                report.pruned += 1;
                continue;
            }
            match registry::reconstruct(&entry.kind, self.store, entry.data, entry.timestamp) {
                Ok(cmd) => commands.push(cmd),
                Err(e) => self.skip(report, stack, position, e.to_string()),
            }
        }
        commands
    }

    fn skip(&self, report: &mut LoadReport, stack: StackSide, position: usize, reason: String) {
        warn!(
            target: "seatlog.persist",
            stack = %stack,
            index = position,
            reason = %reason,
            "skipping history entry"
        );
        report.skipped.push(SkippedEntry {
            stack,
            position,
            reason,
        });
    }
}

impl HistoryManager {
    /// Capture both stacks as a snapshot.
    pub fn snapshot(&self) -> Result<HistorySnapshot, PersistError> {
        HistorySnapshot::capture(self)
    }

    /// Replace both stacks with the commands of a load.
    pub fn restore(&mut self, report: LoadReport) {
        self.replace_stacks(report.undo, report.redo);
    }
}

/// RFC 3339 out; RFC 3339 or naive ISO-8601 (read as local time) in.
mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        let naive = NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|ts| ts.with_timezone(&Utc))
    }
}
