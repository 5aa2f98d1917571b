#![forbid(unsafe_code)]

use std::rc::Rc;

use seatlog_core::{EntityKind, SharedStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Restorable;
use crate::undo::command::{
    CommandError, CommandKind, CommandMetadata, CommandResult, UndoableCmd, to_payload,
};

/// `None` on either side means "no override": the key is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeStudentStylePayload {
    pub student_id: String,
    pub style_property: String,
    #[serde(default)]
    pub old_value: Option<Value>,
    #[serde(default)]
    pub new_value: Option<Value>,
}

/// Patch one key of a student's sparse style overrides.
pub struct ChangeStudentStyleCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: ChangeStudentStylePayload,
}

impl ChangeStudentStyleCmd {
    /// Capture the current override for `property` and build the command.
    pub fn capture(
        store: &SharedStore,
        student_id: &str,
        property: &str,
        new_value: Option<Value>,
    ) -> Result<Self, CommandError> {
        let old_value = store
            .borrow()
            .entity(EntityKind::Student, student_id)
            .ok_or_else(|| CommandError::missing(EntityKind::Student, student_id))?
            .style_overrides
            .get(property)
            .cloned();
        Ok(Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: ChangeStudentStylePayload {
                student_id: student_id.to_string(),
                style_property: property.to_string(),
                old_value,
                new_value,
            },
        })
    }
}

impl UndoableCmd for ChangeStudentStyleCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::ChangeStudentStyle
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        if store.entity(EntityKind::Student, &p.student_id).is_none() {
            return Err(CommandError::missing(EntityKind::Student, &p.student_id));
        }
        store.patch_style_override(&p.student_id, &p.style_property, p.new_value.clone());
        Ok(format!(
            "Style '{}' updated for {}.",
            p.style_property,
            store.student_name(&p.student_id)
        ))
    }

    fn undo(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        if store.entity(EntityKind::Student, &p.student_id).is_none() {
            return Ok(format!(
                "Undid style '{}' change (student no longer present).",
                p.style_property
            ));
        }
        store.patch_style_override(&p.student_id, &p.style_property, p.old_value.clone());
        Ok(format!(
            "Undid style '{}' change for {}.",
            p.style_property,
            store.student_name(&p.student_id)
        ))
    }

    fn describe(&self) -> String {
        let store = self.store.borrow();
        let who = store
            .entity(EntityKind::Student, &self.payload.student_id)
            .map_or("Unknown", |s| s.short_name());
        format!("Style Change: {} for {who}", self.payload.style_property)
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for ChangeStudentStyleCmd {
    type Payload = ChangeStudentStylePayload;

    fn from_parts(
        store: SharedStore,
        payload: ChangeStudentStylePayload,
        metadata: CommandMetadata,
    ) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}
