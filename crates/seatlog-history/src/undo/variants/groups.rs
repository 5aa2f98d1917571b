#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::rc::Rc;

use seatlog_core::{ClassroomStore, CounterKind, Group, SharedStore};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::Restorable;
use crate::undo::command::{
    CommandError, CommandKind, CommandMetadata, CommandResult, UndoableCmd, to_payload,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManageStudentGroupPayload {
    pub old_groups_snapshot: BTreeMap<String, Group>,
    pub new_groups_snapshot: BTreeMap<String, Group>,
    /// student id -> group id
    pub old_student_group_assignments: BTreeMap<String, String>,
    pub new_student_group_assignments: BTreeMap<String, String>,
    pub old_next_group_id_num: u64,
    pub new_next_group_id_num: u64,
    /// The `next_group_id_num` setting as it was before execute. Absent in
    /// older payloads, where undo writes `old_next_group_id_num` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_next_group_id_setting: Option<PriorSetting>,
}

/// A settings value captured before a command overwrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum PriorSetting {
    Absent,
    Present(Value),
}

const NEXT_GROUP_ID_KEY: &str = "next_group_id_num";

/// Replace the whole group table, every student's group assignment and the
/// group id counter in one step.
pub struct ManageStudentGroupCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: ManageStudentGroupPayload,
}

impl ManageStudentGroupCmd {
    /// Capture the current groups, assignments and counter as the "old" side.
    #[must_use]
    pub fn capture(
        store: &SharedStore,
        new_groups: BTreeMap<String, Group>,
        new_assignments: BTreeMap<String, String>,
        new_next_group_id_num: u64,
    ) -> Self {
        let s = store.borrow();
        let old_assignments = s
            .students
            .iter()
            .filter_map(|(id, student)| Some((id.clone(), student.group_id.clone()?)))
            .collect();
        let payload = ManageStudentGroupPayload {
            old_groups_snapshot: s.student_groups.clone(),
            new_groups_snapshot: new_groups,
            old_student_group_assignments: old_assignments,
            new_student_group_assignments: new_assignments,
            old_next_group_id_num: s.counters.peek(CounterKind::Group),
            new_next_group_id_num,
            old_next_group_id_setting: Some(
                s.settings
                    .get(NEXT_GROUP_ID_KEY)
                    .cloned()
                    .map_or(PriorSetting::Absent, PriorSetting::Present),
            ),
        };
        drop(s);
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload,
        }
    }
}

fn apply_groups(
    store: &mut ClassroomStore,
    groups: &BTreeMap<String, Group>,
    assignments: &BTreeMap<String, String>,
    next_group_id_num: u64,
) {
    store.student_groups = groups.clone();
    for (id, student) in &mut store.students {
        // Students missing from the map lose their group.
        student.group_id = assignments.get(id).cloned();
    }
    store.counters.rollback(CounterKind::Group, next_group_id_num);
}

impl UndoableCmd for ManageStudentGroupCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::ManageStudentGroup
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        apply_groups(
            &mut store,
            &p.new_groups_snapshot,
            &p.new_student_group_assignments,
            p.new_next_group_id_num,
        );
        store
            .settings
            .set(NEXT_GROUP_ID_KEY, json!(p.new_next_group_id_num));
        Ok("Student groups updated.".to_string())
    }

    fn undo(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        apply_groups(
            &mut store,
            &p.old_groups_snapshot,
            &p.old_student_group_assignments,
            p.old_next_group_id_num,
        );
        match &p.old_next_group_id_setting {
            Some(PriorSetting::Present(value)) => {
                store.settings.set(NEXT_GROUP_ID_KEY, value.clone());
            }
            Some(PriorSetting::Absent) => {
                store.settings.remove(NEXT_GROUP_ID_KEY);
            }
            None => {
                store
                    .settings
                    .set(NEXT_GROUP_ID_KEY, json!(p.old_next_group_id_num));
            }
        }
        Ok("Student group update undone.".to_string())
    }

    fn describe(&self) -> String {
        "Manage Student Groups".to_string()
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for ManageStudentGroupCmd {
    type Payload = ManageStudentGroupPayload;

    fn from_parts(
        store: SharedStore,
        payload: ManageStudentGroupPayload,
        metadata: CommandMetadata,
    ) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}
