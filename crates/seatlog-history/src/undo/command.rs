#![forbid(unsafe_code)]

//! Undoable command infrastructure.
//!
//! This module provides the [`UndoableCmd`] trait for reversible mutations of
//! the classroom store, the closed [`CommandKind`] tag set, and the
//! per-command [`CommandMetadata`].
//!
//! # Invariants
//!
//! - `execute()` followed by `undo()` restores every field the command owns
//!   to its exact pre-execute value
//! - `undo()` followed by `redo()` restores the executed state exactly
//! - `payload()` followed by reconstruction through the registry yields a
//!   command with the same behavior
//!
//! # Failure Modes
//!
//! - **Stale reference**: a later, still-undone command removed the target.
//!   - Mitigation: `undo()` checks the target still exists and skips it if not
//! - **State drift**: external changes invalidate captured data.
//!   - Mitigation: `execute()` fails with [`CommandError::EntityNotFound`]
//!     instead of guessing

use std::fmt;

use chrono::{DateTime, Utc};
use seatlog_core::EntityKind;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The closed set of command kinds.
///
/// The wire tag of each kind is the name the host has always written into
/// its history snapshots, so older files keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddItem,
    DeleteItem,
    EditItem,
    MoveItems,
    ChangeItemsSize,
    LogEntry,
    LogHomeworkEntry,
    ChangeStudentStyle,
    ManageStudentGroup,
    ResetSettings,
    MarkLiveQuizQuestion,
    MarkLiveHomework,
    AddGuide,
    DeleteGuide,
    MoveGuide,
}

impl CommandKind {
    pub const ALL: [Self; 15] = [
        Self::AddItem,
        Self::DeleteItem,
        Self::EditItem,
        Self::MoveItems,
        Self::ChangeItemsSize,
        Self::LogEntry,
        Self::LogHomeworkEntry,
        Self::ChangeStudentStyle,
        Self::ManageStudentGroup,
        Self::ResetSettings,
        Self::MarkLiveQuizQuestion,
        Self::MarkLiveHomework,
        Self::AddGuide,
        Self::DeleteGuide,
        Self::MoveGuide,
    ];

    /// The persisted `type` tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::AddItem => "AddItemCommand",
            Self::DeleteItem => "DeleteItemCommand",
            Self::EditItem => "EditItemCommand",
            Self::MoveItems => "MoveItemsCommand",
            Self::ChangeItemsSize => "ChangeItemsSizeCommand",
            Self::LogEntry => "LogEntryCommand",
            Self::LogHomeworkEntry => "LogHomeworkEntryCommand",
            Self::ChangeStudentStyle => "ChangeStudentStyleCommand",
            Self::ManageStudentGroup => "ManageStudentGroupCommand",
            Self::ResetSettings => "ResetSettingsCommand",
            Self::MarkLiveQuizQuestion => "MarkLiveQuizQuestionCommand",
            Self::MarkLiveHomework => "MarkLiveHomeworkCommand",
            Self::AddGuide => "AddGuideCommand",
            Self::DeleteGuide => "DeleteGuideCommand",
            Self::MoveGuide => "MoveGuideCommand",
        }
    }

    /// Look up a kind by its persisted tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Transient kinds refresh the view but never force a persistence flush.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::MarkLiveQuizQuestion | Self::MarkLiveHomework)
    }

    /// Kinds the host may gate behind an edit password.
    #[must_use]
    pub const fn is_sensitive_edit(self) -> bool {
        matches!(
            self,
            Self::AddItem
                | Self::DeleteItem
                | Self::EditItem
                | Self::ChangeItemsSize
                | Self::ManageStudentGroup
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Where a command instance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandSource {
    /// Constructed from a confirmed user action.
    #[default]
    User,
    /// Reconstructed from a persisted history snapshot.
    Restored,
}

/// Metadata attached to every command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMetadata {
    /// When the command was created. Drives age-based pruning.
    pub timestamp: DateTime<Utc>,
    /// Who/what produced the command.
    pub source: CommandSource,
}

impl CommandMetadata {
    /// Metadata stamped with the current time.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    #[must_use]
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            source: CommandSource::User,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.source = source;
        self
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::now()
    }
}

/// Result of command execution or undo. `Ok` carries the status line for the
/// user ("Moved 3 item(s).").
pub type CommandResult = Result<String, CommandError>;

/// Errors raised inside a command's `execute()` / `undo()`.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{kind} '{id}' not found")]
    EntityNotFound { kind: EntityKind, id: String },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

impl CommandError {
    #[must_use]
    pub fn missing(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::EntityNotFound {
            kind,
            id: id.into(),
        }
    }
}

/// A reversible, serializable mutation of the classroom store.
///
/// Implementations hold a handle to the store (injected at construction) and
/// own their captured payload exclusively; [`payload`](Self::payload) hands
/// out a copy.
pub trait UndoableCmd {
    /// The variant tag.
    fn kind(&self) -> CommandKind;

    /// Get the command metadata.
    fn metadata(&self) -> &CommandMetadata;

    /// Apply the forward effect.
    fn execute(&mut self) -> CommandResult;

    /// Apply the inverse using the captured payload.
    fn undo(&mut self) -> CommandResult;

    /// Reapply after an undo.
    fn redo(&mut self) -> CommandResult {
        self.execute()
    }

    /// Short human-readable summary for the history browser.
    fn describe(&self) -> String;

    /// Serialize the variant payload (the `data` of a persisted entry).
    fn payload(&self) -> Result<Value, CommandError>;

    fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

impl fmt::Debug for dyn UndoableCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.kind().tag())
            .field("description", &self.describe())
            .field("timestamp", &self.metadata().timestamp)
            .finish()
    }
}

/// Serialize a payload struct into the persisted `data` value.
pub(crate) fn to_payload<P: Serialize>(payload: &P) -> Result<Value, CommandError> {
    Ok(serde_json::to_value(payload)?)
}
