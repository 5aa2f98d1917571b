#![forbid(unsafe_code)]

//! Closed registry from persisted kind tags to constructors.
//!
//! Reconstruction is a total function over [`CommandKind`]: every kind has
//! exactly one constructor, and an unrecognized tag is an ordinary error
//! rather than a lookup failure deep inside deserialization.

use chrono::{DateTime, Utc};
use seatlog_core::{LogBook, SharedStore};
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use super::command::{CommandKind, CommandMetadata, CommandSource, UndoableCmd};
use super::variants::{
    AddGuideCmd, AddItemCmd, ChangeItemsSizeCmd, ChangeStudentStyleCmd, DeleteGuideCmd,
    DeleteItemCmd, EditItemCmd, LogAppendCmd, ManageStudentGroupCmd, MarkLiveHomeworkCmd,
    MarkLiveQuizQuestionCmd, MoveGuideCmd, MoveItemsCmd, ResetSettingsCmd, Restorable,
};

/// Builds a command of one kind from its persisted payload.
pub type Constructor =
    fn(SharedStore, Value, CommandMetadata) -> Result<Box<dyn UndoableCmd>, serde_json::Error>;

/// Errors raised while turning a persisted entry back into a command.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown command kind '{0}'")]
    UnknownKind(String),

    #[error("malformed {kind} payload: {source}")]
    Malformed {
        kind: CommandKind,
        #[source]
        source: serde_json::Error,
    },
}

fn restore<C: Restorable>(
    store: SharedStore,
    data: Value,
    metadata: CommandMetadata,
) -> Result<Box<dyn UndoableCmd>, serde_json::Error> {
    let payload = serde_json::from_value::<C::Payload>(data)?;
    Ok(Box::new(C::from_parts(store, payload, metadata)))
}

const BEHAVIOR: bool = false;
const HOMEWORK: bool = true;

fn restore_log<const HOMEWORK_BOOK: bool>(
    store: SharedStore,
    data: Value,
    metadata: CommandMetadata,
) -> Result<Box<dyn UndoableCmd>, serde_json::Error> {
    let book = if HOMEWORK_BOOK {
        LogBook::Homework
    } else {
        LogBook::Behavior
    };
    let payload = serde_json::from_value(data)?;
    Ok(Box::new(LogAppendCmd::from_parts(store, payload, metadata, book)))
}

/// The constructor registered for `kind`.
#[must_use]
pub fn constructor(kind: CommandKind) -> Constructor {
    match kind {
        CommandKind::AddItem => restore::<AddItemCmd>,
        CommandKind::DeleteItem => restore::<DeleteItemCmd>,
        CommandKind::EditItem => restore::<EditItemCmd>,
        CommandKind::MoveItems => restore::<MoveItemsCmd>,
        CommandKind::ChangeItemsSize => restore::<ChangeItemsSizeCmd>,
        CommandKind::LogEntry => restore_log::<BEHAVIOR>,
        CommandKind::LogHomeworkEntry => restore_log::<HOMEWORK>,
        CommandKind::ChangeStudentStyle => restore::<ChangeStudentStyleCmd>,
        CommandKind::ManageStudentGroup => restore::<ManageStudentGroupCmd>,
        CommandKind::ResetSettings => restore::<ResetSettingsCmd>,
        CommandKind::MarkLiveQuizQuestion => restore::<MarkLiveQuizQuestionCmd>,
        CommandKind::MarkLiveHomework => restore::<MarkLiveHomeworkCmd>,
        CommandKind::AddGuide => restore::<AddGuideCmd>,
        CommandKind::DeleteGuide => restore::<DeleteGuideCmd>,
        CommandKind::MoveGuide => restore::<MoveGuideCmd>,
    }
}

/// Rebuild a command from a persisted `(type, timestamp, data)` triple.
///
/// The returned command is marked [`CommandSource::Restored`].
pub fn reconstruct(
    tag: &str,
    store: &SharedStore,
    data: Value,
    timestamp: DateTime<Utc>,
) -> Result<Box<dyn UndoableCmd>, RegistryError> {
    let kind = CommandKind::from_tag(tag).ok_or_else(|| RegistryError::UnknownKind(tag.to_string()))?;
    let metadata = CommandMetadata::at(timestamp).with_source(CommandSource::Restored);
    let cmd = constructor(kind)(store.clone(), data, metadata)
        .map_err(|source| RegistryError::Malformed { kind, source })?;
    trace!(target: "seatlog.registry", kind = %kind, "reconstructed command");
    Ok(cmd)
}
