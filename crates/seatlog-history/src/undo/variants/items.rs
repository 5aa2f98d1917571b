#![forbid(unsafe_code)]

//! Entity commands: create, delete, edit, batch move and batch resize.

use std::collections::BTreeMap;
use std::rc::Rc;

use seatlog_core::{CounterKind, Entity, EntityKind, IdCounters, LogBook, LogRecord, SharedStore};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Restorable, summarize_names};
use crate::undo::command::{
    CommandError, CommandKind, CommandMetadata, CommandResult, UndoableCmd, to_payload,
};

fn counter_for(kind: EntityKind) -> CounterKind {
    match kind {
        EntityKind::Student => CounterKind::Student,
        EntityKind::Furniture => CounterKind::Furniture,
    }
}

fn label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Student => "Student",
        EntityKind::Furniture => "Furniture",
    }
}

// ============================================================================
// Create
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItemPayload {
    pub item_id: String,
    pub item_type: EntityKind,
    pub item_data: Entity,
    /// Counter value before the id was allocated.
    pub old_next_id_num: u64,
    /// Counter value after allocation. Older snapshots carry it inside
    /// `item_data` as `original_next_id_num_after_add`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_next_id_num: Option<u64>,
}

/// Insert a new student or piece of furniture.
pub struct AddItemCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: AddItemPayload,
}

impl AddItemCmd {
    /// Reserve the next id for `kind` and build the command.
    ///
    /// The counter itself only advances when the command executes.
    #[must_use]
    pub fn allocate(store: &SharedStore, kind: EntityKind, mut entity: Entity) -> Self {
        let counter = counter_for(kind);
        let old = store.borrow().counters.peek(counter);
        let item_id = IdCounters::format_id(counter, old);
        entity.id.clone_from(&item_id);
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: AddItemPayload {
                item_id,
                item_type: kind,
                item_data: entity,
                old_next_id_num: old,
                new_next_id_num: Some(old + 1),
            },
        }
    }

    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.payload.item_id
    }

    fn next_after_add(&self) -> Option<u64> {
        self.payload.new_next_id_num.or_else(|| {
            self.payload
                .item_data
                .attributes
                .get("original_next_id_num_after_add")
                .and_then(Value::as_u64)
        })
    }
}

impl UndoableCmd for AddItemCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::AddItem
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let next = self.next_after_add();
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        store.upsert_entity(p.item_type, &p.item_id, p.item_data.clone());
        if let Some(next) = next {
            store.counters.rollback(counter_for(p.item_type), next);
        }
        Ok(format!("{} '{}' added.", label(p.item_type), p.item_data.name))
    }

    fn undo(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        let removed = store.remove_entity(p.item_type, &p.item_id);
        store
            .counters
            .rollback(counter_for(p.item_type), p.old_next_id_num);
        Ok(match removed {
            Some(entity) => format!("Undid add of {} '{}'.", p.item_type, entity.name),
            None => format!("Undid add of {} '{}' (already removed).", p.item_type, p.item_id),
        })
    }

    fn describe(&self) -> String {
        let name = if self.payload.item_data.name.is_empty() {
            &self.payload.item_id
        } else {
            &self.payload.item_data.name
        };
        format!("Add {}: {name}", self.payload.item_type)
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for AddItemCmd {
    type Payload = AddItemPayload;

    fn from_parts(store: SharedStore, payload: AddItemPayload, metadata: CommandMetadata) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}

// ============================================================================
// Delete
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteItemPayload {
    pub item_id: String,
    pub item_type: EntityKind,
    pub item_data: Entity,
    /// Behavior and quiz records removed alongside a student.
    #[serde(default)]
    pub associated_logs: Vec<LogRecord>,
    #[serde(default)]
    pub associated_homework_logs: Vec<LogRecord>,
}

/// Remove an entity; deleting a student cascades to its log records.
pub struct DeleteItemCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: DeleteItemPayload,
}

impl DeleteItemCmd {
    /// Snapshot the entity (and a student's logs) as they are now.
    pub fn capture(store: &SharedStore, kind: EntityKind, id: &str) -> Result<Self, CommandError> {
        let s = store.borrow();
        let entity = s
            .entity(kind, id)
            .cloned()
            .ok_or_else(|| CommandError::missing(kind, id))?;
        let owned = |book| -> Vec<LogRecord> {
            if kind != EntityKind::Student {
                return Vec::new();
            }
            s.log(book)
                .iter()
                .filter(|r| r.student_id == id)
                .cloned()
                .collect()
        };
        let payload = DeleteItemPayload {
            item_id: id.to_string(),
            item_type: kind,
            item_data: entity,
            associated_logs: owned(LogBook::Behavior),
            associated_homework_logs: owned(LogBook::Homework),
        };
        drop(s);
        Ok(Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload,
        })
    }
}

impl UndoableCmd for DeleteItemCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::DeleteItem
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let p = &mut self.payload;
        let mut store = self.store.borrow_mut();
        // Re-capture what is actually removed so undo is an exact inverse.
        p.item_data = store
            .remove_entity(p.item_type, &p.item_id)
            .ok_or_else(|| CommandError::missing(p.item_type, &p.item_id))?;
        match p.item_type {
            EntityKind::Student => {
                p.associated_logs = store.take_logs_for(LogBook::Behavior, &p.item_id);
                p.associated_homework_logs = store.take_logs_for(LogBook::Homework, &p.item_id);
                Ok(format!(
                    "Student '{}', {} behavior/quiz log(s), and {} homework log(s) deleted.",
                    p.item_data.name,
                    p.associated_logs.len(),
                    p.associated_homework_logs.len()
                ))
            }
            EntityKind::Furniture => Ok(format!("Furniture '{}' deleted.", p.item_data.name)),
        }
    }

    fn undo(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        store.upsert_entity(p.item_type, &p.item_id, p.item_data.clone());
        match p.item_type {
            EntityKind::Student => {
                store.restore_logs(LogBook::Behavior, &p.associated_logs);
                store.restore_logs(LogBook::Homework, &p.associated_homework_logs);
                Ok(format!(
                    "Undid delete of student '{}'. Logs restored.",
                    p.item_data.name
                ))
            }
            EntityKind::Furniture => Ok(format!(
                "Undid delete of furniture '{}'.",
                p.item_data.name
            )),
        }
    }

    fn describe(&self) -> String {
        format!(
            "Delete {}: {}",
            self.payload.item_type, self.payload.item_data.name
        )
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for DeleteItemCmd {
    type Payload = DeleteItemPayload;

    fn from_parts(store: SharedStore, payload: DeleteItemPayload, metadata: CommandMetadata) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}

// ============================================================================
// Edit
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditItemPayload {
    pub item_id: String,
    pub item_type: EntityKind,
    pub old_item_data_snapshot: Entity,
    pub new_item_data_changes: BTreeMap<String, Value>,
}

/// Overlay a field delta on an entity; undo restores the full snapshot.
pub struct EditItemCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: EditItemPayload,
}

impl EditItemCmd {
    pub fn capture(
        store: &SharedStore,
        kind: EntityKind,
        id: &str,
        changes: BTreeMap<String, Value>,
    ) -> Result<Self, CommandError> {
        let snapshot = store
            .borrow()
            .entity(kind, id)
            .cloned()
            .ok_or_else(|| CommandError::missing(kind, id))?;
        Ok(Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: EditItemPayload {
                item_id: id.to_string(),
                item_type: kind,
                old_item_data_snapshot: snapshot,
                new_item_data_changes: changes,
            },
        })
    }
}

impl UndoableCmd for EditItemCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::EditItem
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        let entity = store
            .entity_mut(p.item_type, &p.item_id)
            .ok_or_else(|| CommandError::missing(p.item_type, &p.item_id))?;
        entity.apply_changes(&p.new_item_data_changes)?;
        Ok(format!("{} '{}' edited.", label(p.item_type), entity.name))
    }

    fn undo(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        if store.entity(p.item_type, &p.item_id).is_none() {
            return Ok(format!(
                "Undid edit for {} '{}' (no longer present).",
                p.item_type, p.item_id
            ));
        }
        store.upsert_entity(p.item_type, &p.item_id, p.old_item_data_snapshot.clone());
        Ok(format!(
            "Undid edit for {} '{}'.",
            p.item_type, p.old_item_data_snapshot.name
        ))
    }

    fn describe(&self) -> String {
        let fields = self
            .payload
            .new_item_data_changes
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Edit {}: {} (Fields: {fields})",
            self.payload.item_type, self.payload.old_item_data_snapshot.name
        )
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for EditItemCmd {
    type Payload = EditItemPayload;

    fn from_parts(store: SharedStore, payload: EditItemPayload, metadata: CommandMetadata) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}

// ============================================================================
// Batch move
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMove {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: EntityKind,
    pub old_x: f64,
    pub old_y: f64,
    pub new_x: f64,
    pub new_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveItemsPayload {
    pub items_moves: Vec<ItemMove>,
}

/// Move any number of entities in one step.
pub struct MoveItemsCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: MoveItemsPayload,
}

impl MoveItemsCmd {
    #[must_use]
    pub fn new(store: &SharedStore, moves: Vec<ItemMove>) -> Self {
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: MoveItemsPayload { items_moves: moves },
        }
    }

    fn apply(&self, forward: bool) {
        let mut store = self.store.borrow_mut();
        for m in &self.payload.items_moves {
            // Items removed by a later command are skipped.
            if let Some(entity) = store.entity_mut(m.item_type, &m.id) {
                let (x, y) = if forward {
                    (m.new_x, m.new_y)
                } else {
                    (m.old_x, m.old_y)
                };
                entity.x = x;
                entity.y = y;
            }
        }
    }
}

impl UndoableCmd for MoveItemsCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::MoveItems
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        self.apply(true);
        Ok(format!("Moved {} item(s).", self.payload.items_moves.len()))
    }

    fn undo(&mut self) -> CommandResult {
        self.apply(false);
        Ok(format!(
            "Undid move of {} item(s).",
            self.payload.items_moves.len()
        ))
    }

    fn describe(&self) -> String {
        format!("Move {} item(s)", self.payload.items_moves.len())
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for MoveItemsCmd {
    type Payload = MoveItemsPayload;

    fn from_parts(store: SharedStore, payload: MoveItemsPayload, metadata: CommandMetadata) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}

// ============================================================================
// Batch resize
// ============================================================================

/// A student's width/height style overrides as they were before a resize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriorStyle {
    pub width: Option<Value>,
    pub height: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResize {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: EntityKind,
    pub old_w: f64,
    pub old_h: f64,
    pub new_w: f64,
    pub new_h: f64,
    /// Captured on execute. Absent in snapshots written before it existed,
    /// in which case undo writes the old size into the overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_style: Option<PriorStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeItemsSizePayload {
    pub items_sizes_changes: Vec<ItemResize>,
}

/// Resize entities. Students mirror the size into their style overrides.
pub struct ChangeItemsSizeCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: ChangeItemsSizePayload,
}

impl ChangeItemsSizeCmd {
    #[must_use]
    pub fn new(store: &SharedStore, changes: Vec<ItemResize>) -> Self {
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: ChangeItemsSizePayload {
                items_sizes_changes: changes,
            },
        }
    }
}

fn set_or_clear(map: &mut BTreeMap<String, Value>, key: &str, value: Option<Value>) {
    match value {
        Some(v) => {
            map.insert(key.to_string(), v);
        }
        None => {
            map.remove(key);
        }
    }
}

impl UndoableCmd for ChangeItemsSizeCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::ChangeItemsSize
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let mut store = self.store.borrow_mut();
        let mut names = Vec::new();
        for change in &mut self.payload.items_sizes_changes {
            let Some(entity) = store.entity_mut(change.item_type, &change.id) else {
                continue;
            };
            if change.item_type == EntityKind::Student {
                let overrides = &mut entity.style_overrides;
                change.prior_style = Some(PriorStyle {
                    width: overrides.get("width").cloned(),
                    height: overrides.get("height").cloned(),
                });
                overrides.insert("width".to_string(), json!(change.new_w));
                overrides.insert("height".to_string(), json!(change.new_h));
            }
            entity.width = change.new_w;
            entity.height = change.new_h;
            names.push(entity.name.clone());
        }
        Ok(format!(
            "Size changed for {} item(s): {}.",
            names.len(),
            summarize_names(&names)
        ))
    }

    fn undo(&mut self) -> CommandResult {
        let mut store = self.store.borrow_mut();
        let mut names = Vec::new();
        for change in &self.payload.items_sizes_changes {
            let Some(entity) = store.entity_mut(change.item_type, &change.id) else {
                continue;
            };
            if change.item_type == EntityKind::Student {
                let overrides = &mut entity.style_overrides;
                match &change.prior_style {
                    Some(prior) => {
                        set_or_clear(overrides, "width", prior.width.clone());
                        set_or_clear(overrides, "height", prior.height.clone());
                    }
                    None => {
                        overrides.insert("width".to_string(), json!(change.old_w));
                        overrides.insert("height".to_string(), json!(change.old_h));
                    }
                }
            }
            entity.width = change.old_w;
            entity.height = change.old_h;
            names.push(entity.name.clone());
        }
        Ok(format!(
            "Undid size change for {} item(s): {}.",
            names.len(),
            summarize_names(&names)
        ))
    }

    fn describe(&self) -> String {
        format!(
            "Resize {} item(s)",
            self.payload.items_sizes_changes.len()
        )
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for ChangeItemsSizeCmd {
    type Payload = ChangeItemsSizePayload;

    fn from_parts(
        store: SharedStore,
        payload: ChangeItemsSizePayload,
        metadata: CommandMetadata,
    ) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::variants::test_support::seeded_store;
    use seatlog_core::LogKind;

    #[test]
    fn add_then_undo_restores_counter_and_removes_entity() {
        let store = seeded_store();
        let before = store.borrow().clone();
        let mut cmd = AddItemCmd::allocate(
            &store,
            EntityKind::Student,
            Entity::new("", "Grace Hopper", 50.0, 60.0),
        );
        assert_eq!(cmd.item_id(), "student_3");

        assert_eq!(cmd.execute().unwrap(), "Student 'Grace Hopper' added.");
        assert_eq!(store.borrow().counters.student, 4);
        assert!(store.borrow().students.contains_key("student_3"));

        cmd.undo().unwrap();
        assert_eq!(*store.borrow(), before);
    }

    #[test]
    fn add_reads_legacy_next_id_from_item_data() {
        let store = seeded_store();
        let payload: AddItemPayload = serde_json::from_value(json!({
            "item_id": "furniture_9",
            "item_type": "furniture",
            "item_data": {"name": "Bookshelf", "x": 1, "y": 2, "width": 40, "height": 90,
                          "original_next_id_num_after_add": 10},
            "old_next_id_num": 9
        }))
        .unwrap();
        let mut cmd = AddItemCmd::from_parts(store.clone(), payload, CommandMetadata::now());
        cmd.execute().unwrap();
        assert_eq!(store.borrow().counters.furniture, 10);
        cmd.undo().unwrap();
        assert_eq!(store.borrow().counters.furniture, 9);
    }

    #[test]
    fn delete_student_cascades_logs_and_undo_restores_them() {
        let store = seeded_store();
        {
            let mut s = store.borrow_mut();
            s.append_log(
                LogBook::Behavior,
                LogRecord::new("2024-03-01T09:00:00", "student_1", LogKind::Behavior, "Talking"),
            );
            s.append_log(
                LogBook::Behavior,
                LogRecord::new("2024-03-01T09:05:00", "student_2", LogKind::Quiz, "Unit 1"),
            );
            s.append_log(
                LogBook::Homework,
                LogRecord::new("2024-03-01T08:00:00", "student_1", LogKind::Homework, "Worksheet"),
            );
        }
        let before = store.borrow().clone();

        let mut cmd = DeleteItemCmd::capture(&store, EntityKind::Student, "student_1").unwrap();
        let msg = cmd.execute().unwrap();
        assert!(msg.contains("1 behavior/quiz log(s), and 1 homework log(s)"), "{msg}");
        {
            let s = store.borrow();
            assert!(!s.students.contains_key("student_1"));
            assert_eq!(s.behavior_log.len(), 1);
            assert!(s.homework_log.is_empty());
        }

        cmd.undo().unwrap();
        assert_eq!(*store.borrow(), before);
    }

    #[test]
    fn delete_missing_entity_is_rejected_at_capture() {
        let store = seeded_store();
        assert!(matches!(
            DeleteItemCmd::capture(&store, EntityKind::Furniture, "furniture_99"),
            Err(CommandError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn delete_execute_fails_when_entity_vanished() {
        let store = seeded_store();
        store.borrow_mut().append_log(
            LogBook::Behavior,
            LogRecord::new("2024-03-01T09:00:00", "student_1", LogKind::Behavior, "Talking"),
        );
        let mut cmd = DeleteItemCmd::capture(&store, EntityKind::Student, "student_1").unwrap();
        store
            .borrow_mut()
            .remove_entity(EntityKind::Student, "student_1");
        let before = store.borrow().clone();

        assert!(matches!(
            cmd.execute(),
            Err(CommandError::EntityNotFound { .. })
        ));
        assert_eq!(*store.borrow(), before);
        assert_eq!(store.borrow().behavior_log.len(), 1);
    }

    #[test]
    fn edit_applies_delta_and_undo_restores_snapshot() {
        let store = seeded_store();
        let before = store.borrow().clone();
        let changes = BTreeMap::from([
            ("name".to_string(), json!("Ada King")),
            ("nickname".to_string(), json!("Countess")),
        ]);
        let mut cmd = EditItemCmd::capture(&store, EntityKind::Student, "student_1", changes).unwrap();
        assert_eq!(cmd.execute().unwrap(), "Student 'Ada King' edited.");
        assert_eq!(cmd.describe(), "Edit student: Ada Lovelace (Fields: name, nickname)");
        cmd.undo().unwrap();
        assert_eq!(*store.borrow(), before);
    }

    #[test]
    fn edit_execute_fails_when_entity_vanished() {
        let store = seeded_store();
        let mut cmd = EditItemCmd::capture(
            &store,
            EntityKind::Student,
            "student_2",
            BTreeMap::from([("name".to_string(), json!("A. Turing"))]),
        )
        .unwrap();
        store.borrow_mut().remove_entity(EntityKind::Student, "student_2");
        assert!(matches!(cmd.execute(), Err(CommandError::EntityNotFound { .. })));
        // Undo tolerates the missing entity.
        assert!(cmd.undo().is_ok());
    }

    #[test]
    fn move_skips_missing_items() {
        let store = seeded_store();
        let mut cmd = MoveItemsCmd::new(
            &store,
            vec![
                ItemMove {
                    id: "student_1".into(),
                    item_type: EntityKind::Student,
                    old_x: 10.0,
                    old_y: 10.0,
                    new_x: 50.0,
                    new_y: 50.0,
                },
                ItemMove {
                    id: "student_42".into(),
                    item_type: EntityKind::Student,
                    old_x: 0.0,
                    old_y: 0.0,
                    new_x: 1.0,
                    new_y: 1.0,
                },
            ],
        );
        assert_eq!(cmd.execute().unwrap(), "Moved 2 item(s).");
        assert_eq!(store.borrow().students["student_1"].x, 50.0);
        assert_eq!(cmd.undo().unwrap(), "Undid move of 2 item(s).");
        assert_eq!(store.borrow().students["student_1"].y, 10.0);
    }

    #[test]
    fn resize_restores_absent_overrides_exactly() {
        let store = seeded_store();
        let before = store.borrow().clone();
        let mut cmd = ChangeItemsSizeCmd::new(
            &store,
            vec![
                ItemResize {
                    id: "student_1".into(),
                    item_type: EntityKind::Student,
                    old_w: 130.0,
                    old_h: 80.0,
                    new_w: 160.0,
                    new_h: 90.0,
                    prior_style: None,
                },
                ItemResize {
                    id: "furniture_1".into(),
                    item_type: EntityKind::Furniture,
                    old_w: 200.0,
                    old_h: 100.0,
                    new_w: 220.0,
                    new_h: 110.0,
                    prior_style: None,
                },
            ],
        );
        let msg = cmd.execute().unwrap();
        assert_eq!(msg, "Size changed for 2 item(s): Ada Lovelace, Teacher's Desk.");
        assert_eq!(
            store.borrow().students["student_1"].style_overrides.get("width"),
            Some(&json!(160.0))
        );
        cmd.undo().unwrap();
        assert_eq!(*store.borrow(), before);
    }
}
