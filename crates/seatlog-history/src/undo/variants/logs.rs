#![forbid(unsafe_code)]

//! Log append commands for the behavior/quiz and homework books.

use std::rc::Rc;

use seatlog_core::{LogBook, LogRecord, LogRemoval, SharedStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::undo::command::{
    CommandError, CommandKind, CommandMetadata, CommandResult, UndoableCmd, to_payload,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPayload {
    pub log_entry: LogRecord,
    pub student_id: String,
}

/// Append one record to a log book. Undo removes it again.
///
/// The same type serves `LogEntryCommand` (behavior and quiz records) and
/// `LogHomeworkEntryCommand`; the book decides the kind tag.
///
/// When an equal record is already in the book, execute leaves the book
/// alone and the matching undo removes nothing.
pub struct LogAppendCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    book: LogBook,
    payload: LogPayload,
    /// Whether the last execute put a record into the book. Not persisted;
    /// restored commands sit on the undo stack only after they ran.
    inserted: bool,
}

impl LogAppendCmd {
    #[must_use]
    pub fn new_behavior(store: &SharedStore, record: LogRecord) -> Self {
        Self::new(store, LogBook::Behavior, record)
    }

    #[must_use]
    pub fn new_homework(store: &SharedStore, record: LogRecord) -> Self {
        Self::new(store, LogBook::Homework, record)
    }

    fn new(store: &SharedStore, book: LogBook, record: LogRecord) -> Self {
        let student_id = record.student_id.clone();
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            book,
            payload: LogPayload {
                log_entry: record,
                student_id,
            },
            inserted: false,
        }
    }

    pub(crate) fn from_parts(
        store: SharedStore,
        payload: LogPayload,
        metadata: CommandMetadata,
        book: LogBook,
    ) -> Self {
        Self {
            store,
            metadata,
            book,
            payload,
            inserted: true,
        }
    }

    #[must_use]
    pub fn book(&self) -> LogBook {
        self.book
    }

    fn entry_label(&self) -> String {
        match self.book {
            LogBook::Behavior => self.payload.log_entry.kind.label().to_string(),
            LogBook::Homework => "Homework".to_string(),
        }
    }
}

impl UndoableCmd for LogAppendCmd {
    fn kind(&self) -> CommandKind {
        match self.book {
            LogBook::Behavior => CommandKind::LogEntry,
            LogBook::Homework => CommandKind::LogHomeworkEntry,
        }
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let mut store = self.store.borrow_mut();
        self.inserted = store.append_log(self.book, self.payload.log_entry.clone());
        Ok(format!(
            "{} '{}' logged for {}.",
            self.entry_label(),
            self.payload.log_entry.display_name(),
            store.student_name(&self.payload.student_id)
        ))
    }

    fn undo(&mut self) -> CommandResult {
        let entry = &self.payload.log_entry;
        let mut store = self.store.borrow_mut();
        let removal = if self.inserted {
            store.remove_log(self.book, entry)
        } else {
            None
        };
        match removal {
            Some(LogRemoval::Identity) | None => {}
            Some(LogRemoval::FieldMatch) => {
                warn!(
                    target: "seatlog.history",
                    kind = %self.kind(),
                    student_id = %entry.student_id,
                    timestamp = %entry.timestamp,
                    "log record removed by field match, not identity"
                );
            }
        }
        self.inserted = false;
        let label = match self.book {
            LogBook::Behavior => self.entry_label(),
            LogBook::Homework => "homework".to_string(),
        };
        Ok(format!(
            "Undid log of {label} '{}' for {}.",
            entry.display_name(),
            store.student_name(&self.payload.student_id)
        ))
    }

    fn describe(&self) -> String {
        let entry = &self.payload.log_entry;
        let who = entry.student_first_name.as_deref().unwrap_or("Unknown");
        format!(
            "Log {}: '{}' for {who}",
            self.entry_label(),
            entry.display_name()
        )
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::variants::test_support::seeded_store;
    use seatlog_core::LogKind;
    use serde_json::json;

    fn quiz_record() -> LogRecord {
        let mut r = LogRecord::new("2024-05-02T10:00:00", "student_2", LogKind::Quiz, "Unit 3");
        r.student_first_name = Some("Alan".into());
        r.extra.insert("marks_data".into(), json!({"correct": 4}));
        r
    }

    #[test]
    fn behavior_book_appends_and_undo_removes() {
        let store = seeded_store();
        let before = store.borrow().clone();
        let mut cmd = LogAppendCmd::new_behavior(&store, quiz_record());
        assert_eq!(cmd.kind(), CommandKind::LogEntry);
        assert_eq!(cmd.execute().unwrap(), "Quiz 'Unit 3' logged for Alan Turing.");
        assert_eq!(store.borrow().behavior_log.len(), 1);
        assert_eq!(cmd.describe(), "Log Quiz: 'Unit 3' for Alan");

        assert_eq!(cmd.undo().unwrap(), "Undid log of Quiz 'Unit 3' for Alan Turing.");
        assert_eq!(*store.borrow(), before);
    }

    #[test]
    fn homework_book_uses_homework_kind() {
        let store = seeded_store();
        let record = LogRecord::new("2024-05-02T08:00:00", "student_1", LogKind::Homework, "Essay");
        let mut cmd = LogAppendCmd::new_homework(&store, record);
        assert_eq!(cmd.kind(), CommandKind::LogHomeworkEntry);
        assert_eq!(cmd.execute().unwrap(), "Homework 'Essay' logged for Ada Lovelace.");
        assert_eq!(store.borrow().homework_log.len(), 1);
        assert!(store.borrow().behavior_log.is_empty());
        assert_eq!(cmd.undo().unwrap(), "Undid log of homework 'Essay' for Ada Lovelace.");
        assert!(store.borrow().homework_log.is_empty());
    }

    #[test]
    fn undo_falls_back_to_field_match() {
        let store = seeded_store();
        let mut cmd = LogAppendCmd::new_behavior(&store, quiz_record());
        cmd.execute().unwrap();
        // The host annotated the stored record after it was logged.
        store.borrow_mut().behavior_log[0]
            .extra
            .insert("comment".into(), json!("retake"));
        cmd.undo().unwrap();
        assert!(store.borrow().behavior_log.is_empty());
    }

    #[test]
    fn redo_after_undo_appends_once() {
        let store = seeded_store();
        let mut cmd = LogAppendCmd::new_behavior(&store, quiz_record());
        cmd.execute().unwrap();
        cmd.undo().unwrap();
        cmd.redo().unwrap();
        assert_eq!(store.borrow().behavior_log.len(), 1);
        cmd.undo().unwrap();
        assert!(store.borrow().behavior_log.is_empty());
    }

    #[test]
    fn undo_keeps_a_record_that_was_already_logged() {
        let store = seeded_store();
        store
            .borrow_mut()
            .append_log(LogBook::Behavior, quiz_record());
        let before = store.borrow().clone();

        let mut cmd = LogAppendCmd::new_behavior(&store, quiz_record());
        cmd.execute().unwrap();
        assert_eq!(store.borrow().behavior_log.len(), 1);
        cmd.undo().unwrap();
        assert_eq!(store.borrow().behavior_log.len(), 1);
        assert_eq!(*store.borrow(), before);
    }

    #[test]
    fn homework_type_names_show_in_status_lines() {
        let store = seeded_store();
        let mut record = LogRecord::new("2024-05-02T08:00:00", "student_1", LogKind::Homework, "");
        record.homework_type = Some("Worksheet".into());
        record.student_first_name = Some("Ada".into());
        let mut cmd = LogAppendCmd::new_homework(&store, record);
        assert_eq!(cmd.execute().unwrap(), "Homework 'Worksheet' logged for Ada Lovelace.");
        assert_eq!(cmd.describe(), "Log Homework: 'Worksheet' for Ada");
        cmd.undo().unwrap();
        assert!(store.borrow().homework_log.is_empty());
    }
}
