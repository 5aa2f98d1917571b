#![forbid(unsafe_code)]

use std::rc::Rc;

use seatlog_core::{Settings, SharedStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Restorable;
use crate::undo::command::{
    CommandError, CommandKind, CommandMetadata, CommandResult, UndoableCmd, to_payload,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResetSettingsPayload {
    /// Captured on the first execute.
    #[serde(default)]
    pub old_settings: Option<Settings>,
    /// The replacement. `None` means "the defaults".
    #[serde(default)]
    pub new_settings: Option<Settings>,
}

/// Replace the whole settings map; undo puts the old map back verbatim.
pub struct ResetSettingsCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: ResetSettingsPayload,
}

impl ResetSettingsCmd {
    #[must_use]
    pub fn reset_to_defaults(store: &SharedStore) -> Self {
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: ResetSettingsPayload::default(),
        }
    }

    /// Replace the settings with `settings` (e.g. an imported profile).
    #[must_use]
    pub fn replace(store: &SharedStore, settings: Settings) -> Self {
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: ResetSettingsPayload {
                old_settings: None,
                new_settings: Some(settings),
            },
        }
    }
}

impl UndoableCmd for ResetSettingsCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::ResetSettings
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let is_reset = self.payload.new_settings.is_none();
        let next = self.payload.new_settings.clone().unwrap_or_default();
        let previous = self.store.borrow_mut().replace_settings(next.clone());
        if self.payload.old_settings.is_none() {
            self.payload.old_settings = Some(previous);
        }
        // Later redos replay exactly what this execute applied.
        self.payload.new_settings = Some(next);
        Ok(if is_reset {
            "Settings reset to default.".to_string()
        } else {
            "Settings replaced.".to_string()
        })
    }

    fn undo(&mut self) -> CommandResult {
        let old = self.payload.old_settings.clone().ok_or_else(|| {
            CommandError::InvalidState("no settings snapshot was captured".to_string())
        })?;
        self.store.borrow_mut().replace_settings(old);
        Ok("Undo settings reset.".to_string())
    }

    fn describe(&self) -> String {
        "Reset All Settings".to_string()
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for ResetSettingsCmd {
    type Payload = ResetSettingsPayload;

    fn from_parts(store: SharedStore, payload: ResetSettingsPayload, metadata: CommandMetadata) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}
