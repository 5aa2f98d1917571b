#![forbid(unsafe_code)]

//! The classroom domain store.
//!
//! # Invariants
//!
//! 1. `behavior_log` and `homework_log` are sorted by `timestamp` after every
//!    mutating call made through this API.
//! 2. An entity's `id` field equals the key it is stored under.
//!
//! Commands hold a [`SharedStore`] handle and never keep references into the
//! store between calls.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::counters::IdCounters;
use crate::entity::{Entity, EntityKind, Group, Guide};
use crate::log::{LogBook, LogRecord, LogRemoval};
use crate::settings::Settings;

/// Shared, single-threaded handle to the store.
pub type SharedStore = Rc<RefCell<ClassroomStore>>;

/// Live-session quiz tally for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizTally {
    pub correct: u32,
    pub total_asked: u32,
}

impl QuizTally {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.correct == 0 && self.total_asked == 0
    }
}

/// All in-memory collections that commands mutate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassroomStore {
    pub students: BTreeMap<String, Entity>,
    pub furniture: BTreeMap<String, Entity>,
    pub guides: BTreeMap<String, Guide>,
    pub behavior_log: Vec<LogRecord>,
    pub homework_log: Vec<LogRecord>,
    pub student_groups: BTreeMap<String, Group>,
    pub live_quiz_scores: BTreeMap<String, QuizTally>,
    pub live_homework: BTreeMap<String, BTreeMap<String, Value>>,
    pub settings: Settings,
    pub counters: IdCounters,
}

impl ClassroomStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the store in a [`SharedStore`] handle.
    #[must_use]
    pub fn shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    // ========================================================================
    // Entities
    // ========================================================================

    #[must_use]
    pub fn entities(&self, kind: EntityKind) -> &BTreeMap<String, Entity> {
        match kind {
            EntityKind::Student => &self.students,
            EntityKind::Furniture => &self.furniture,
        }
    }

    pub fn entities_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, Entity> {
        match kind {
            EntityKind::Student => &mut self.students,
            EntityKind::Furniture => &mut self.furniture,
        }
    }

    #[must_use]
    pub fn entity(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.entities(kind).get(id)
    }

    pub fn entity_mut(&mut self, kind: EntityKind, id: &str) -> Option<&mut Entity> {
        self.entities_mut(kind).get_mut(id)
    }

    /// Insert or overwrite an entity under `id`, returning the previous one.
    pub fn upsert_entity(&mut self, kind: EntityKind, id: &str, mut entity: Entity) -> Option<Entity> {
        entity.id = id.to_string();
        self.entities_mut(kind).insert(id.to_string(), entity)
    }

    pub fn remove_entity(&mut self, kind: EntityKind, id: &str) -> Option<Entity> {
        self.entities_mut(kind).remove(id)
    }

    /// Display name of a student, or `"Unknown Student"`.
    #[must_use]
    pub fn student_name(&self, id: &str) -> String {
        self.students
            .get(id)
            .map_or_else(|| "Unknown Student".to_string(), |s| s.name.clone())
    }

    // ========================================================================
    // Ordered logs
    // ========================================================================

    #[must_use]
    pub fn log(&self, book: LogBook) -> &[LogRecord] {
        match book {
            LogBook::Behavior => &self.behavior_log,
            LogBook::Homework => &self.homework_log,
        }
    }

    fn log_mut(&mut self, book: LogBook) -> &mut Vec<LogRecord> {
        match book {
            LogBook::Behavior => &mut self.behavior_log,
            LogBook::Homework => &mut self.homework_log,
        }
    }

    /// Append a record unless an equal one is already present.
    ///
    /// Returns `true` if the record was inserted.
    pub fn append_log(&mut self, book: LogBook, record: LogRecord) -> bool {
        let log = self.log_mut(book);
        if log.contains(&record) {
            return false;
        }
        log.push(record);
        sort_by_time(log);
        true
    }

    /// Remove one record: by exact identity first, then by the first record
    /// whose (timestamp, owner, name) fields match.
    pub fn remove_log(&mut self, book: LogBook, record: &LogRecord) -> Option<LogRemoval> {
        let log = self.log_mut(book);
        if let Some(pos) = log.iter().position(|r| r == record) {
            log.remove(pos);
            return Some(LogRemoval::Identity);
        }
        let pos = log.iter().position(|r| r.same_key_fields(record))?;
        log.remove(pos);
        Some(LogRemoval::FieldMatch)
    }

    /// Remove and return every record owned by `student_id`, in log order.
    pub fn take_logs_for(&mut self, book: LogBook, student_id: &str) -> Vec<LogRecord> {
        let log = self.log_mut(book);
        let (taken, kept): (Vec<_>, Vec<_>) =
            log.drain(..).partition(|r| r.student_id == student_id);
        *log = kept;
        taken
    }

    /// Re-insert records that are not already present, then resort.
    ///
    /// Returns how many records were inserted.
    pub fn restore_logs(&mut self, book: LogBook, records: &[LogRecord]) -> usize {
        let log = self.log_mut(book);
        let mut inserted = 0;
        for record in records {
            if !log.contains(record) {
                log.push(record.clone());
                inserted += 1;
            }
        }
        sort_by_time(log);
        inserted
    }

    // ========================================================================
    // Sparse overrides and settings
    // ========================================================================

    /// Set (`Some`) or clear (`None`) one style override on a student.
    ///
    /// Returns the previous value, or `None` if the student does not exist
    /// or had no override for `property`.
    pub fn patch_style_override(
        &mut self,
        student_id: &str,
        property: &str,
        value: Option<Value>,
    ) -> Option<Value> {
        let student = self.students.get_mut(student_id)?;
        match value {
            Some(v) => student.style_overrides.insert(property.to_string(), v),
            None => student.style_overrides.remove(property),
        }
    }

    /// Replace the whole settings map, returning the old one.
    pub fn replace_settings(&mut self, settings: Settings) -> Settings {
        std::mem::replace(&mut self.settings, settings)
    }
}

fn sort_by_time(log: &mut [LogRecord]) {
    // Stable: records sharing a timestamp keep insertion order.
    log.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}
