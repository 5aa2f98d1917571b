#![forbid(unsafe_code)]

//! Layout guide commands.

use std::rc::Rc;

use seatlog_core::{CounterKind, Guide, GuideOrientation, IdCounters, SharedStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Restorable;
use crate::undo::command::{
    CommandError, CommandKind, CommandMetadata, CommandResult, UndoableCmd, to_payload,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddGuidePayload {
    pub item_id: String,
    pub item_type: GuideOrientation,
    pub item_data: Guide,
    pub old_next_id_num: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_next_id_num: Option<u64>,
}

pub struct AddGuideCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: AddGuidePayload,
}

impl AddGuideCmd {
    /// Reserve the next guide id for a guide at `world_coord`.
    #[must_use]
    pub fn allocate(store: &SharedStore, orientation: GuideOrientation, world_coord: f64) -> Self {
        let old = store.borrow().counters.peek(CounterKind::Guide);
        let item_id = IdCounters::format_id(CounterKind::Guide, old);
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: AddGuidePayload {
                item_id: item_id.clone(),
                item_type: orientation,
                item_data: Guide {
                    id: item_id,
                    orientation,
                    world_coord,
                },
                old_next_id_num: old,
                new_next_id_num: Some(old + 1),
            },
        }
    }

    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.payload.item_id
    }
}

impl UndoableCmd for AddGuideCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::AddGuide
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        let mut guide = p.item_data.clone();
        guide.id.clone_from(&p.item_id);
        store.guides.insert(p.item_id.clone(), guide);
        if let Some(next) = p.new_next_id_num {
            store.counters.rollback(CounterKind::Guide, next);
        }
        Ok(format!(
            "Added {} guide at {}.",
            p.item_type.as_str(),
            p.item_data.world_coord
        ))
    }

    fn undo(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        store.guides.remove(&p.item_id);
        store.counters.rollback(CounterKind::Guide, p.old_next_id_num);
        Ok(format!(
            "Undid add of {} guide at {}.",
            p.item_type.as_str(),
            p.item_data.world_coord
        ))
    }

    fn describe(&self) -> String {
        format!(
            "Add {} guide at {}",
            self.payload.item_type.as_str(),
            self.payload.item_data.world_coord
        )
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for AddGuideCmd {
    type Payload = AddGuidePayload;

    fn from_parts(store: SharedStore, payload: AddGuidePayload, metadata: CommandMetadata) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteGuidePayload {
    pub item_id: String,
    pub item_type: GuideOrientation,
    pub item_data: Guide,
}

pub struct DeleteGuideCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: DeleteGuidePayload,
}

impl DeleteGuideCmd {
    pub fn capture(store: &SharedStore, id: &str) -> Result<Self, CommandError> {
        let guide = store
            .borrow()
            .guides
            .get(id)
            .cloned()
            .ok_or_else(|| CommandError::InvalidState(format!("guide '{id}' not found")))?;
        Ok(Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: DeleteGuidePayload {
                item_id: id.to_string(),
                item_type: guide.orientation,
                item_data: guide,
            },
        })
    }
}

impl UndoableCmd for DeleteGuideCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::DeleteGuide
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let p = &mut self.payload;
        p.item_data = self
            .store
            .borrow_mut()
            .guides
            .remove(&p.item_id)
            .ok_or_else(|| CommandError::InvalidState(format!("guide '{}' not found", p.item_id)))?;
        Ok(format!(
            "Deleted {} guide at {}",
            p.item_type.as_str(),
            p.item_data.world_coord
        ))
    }

    fn undo(&mut self) -> CommandResult {
        let p = &self.payload;
        self.store
            .borrow_mut()
            .guides
            .insert(p.item_id.clone(), p.item_data.clone());
        Ok(format!(
            "Undid delete of {} guide at {}",
            p.item_type.as_str(),
            p.item_data.world_coord
        ))
    }

    fn describe(&self) -> String {
        format!(
            "Delete {} guide at {}",
            self.payload.item_type.as_str(),
            self.payload.item_data.world_coord
        )
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for DeleteGuideCmd {
    type Payload = DeleteGuidePayload;

    fn from_parts(store: SharedStore, payload: DeleteGuidePayload, metadata: CommandMetadata) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideMove {
    pub id: String,
    pub old_coord: f64,
    pub new_coord: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveGuidePayload {
    pub items_moves: Vec<GuideMove>,
}

pub struct MoveGuideCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: MoveGuidePayload,
}

impl MoveGuideCmd {
    #[must_use]
    pub fn new(store: &SharedStore, moves: Vec<GuideMove>) -> Self {
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: MoveGuidePayload { items_moves: moves },
        }
    }

    fn apply(&self, forward: bool) {
        let mut store = self.store.borrow_mut();
        for m in &self.payload.items_moves {
            if let Some(guide) = store.guides.get_mut(&m.id) {
                guide.world_coord = if forward { m.new_coord } else { m.old_coord };
            }
        }
    }
}

impl UndoableCmd for MoveGuideCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::MoveGuide
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        self.apply(true);
        Ok(format!("Moved {} guide(s).", self.payload.items_moves.len()))
    }

    fn undo(&mut self) -> CommandResult {
        self.apply(false);
        Ok(format!(
            "Undid move of {} guide(s).",
            self.payload.items_moves.len()
        ))
    }

    fn describe(&self) -> String {
        format!("Move {} guide(s)", self.payload.items_moves.len())
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for MoveGuideCmd {
    type Payload = MoveGuidePayload;

    fn from_parts(store: SharedStore, payload: MoveGuidePayload, metadata: CommandMetadata) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}
