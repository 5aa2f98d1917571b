#![forbid(unsafe_code)]

//! Two-stack history controller.
//!
//! [`HistoryManager`] owns the undo and redo stacks and drives every
//! transition between them. Commands arrive un-executed:
//! [`execute_command`](HistoryManager::execute_command) runs them, and the
//! manager tells the host what happened through [`HostHooks`].
//!
//! # Invariants
//!
//! 1. A command is never on both stacks, and never on neither while the
//!    manager is between calls.
//! 2. The redo stack is empty after every successful `execute_command`.
//! 3. A failed undo/redo leaves both stacks exactly as they were.
//!
//! ```text
//! execute(A) execute(B) execute(C)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [A, B, C]                         │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [A]                               │
//! │ Redo Stack: [C, B]   (top = B)                │
//! └───────────────────────────────────────────────┘
//!
//! execute(D)  <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [A, D]                            │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;
use tracing::{debug, error, warn};
use web_time::Instant;

use super::command::{CommandError, CommandKind, UndoableCmd};
use crate::config::HistoryConfig;
use crate::hooks::{CommandInfo, FlushReason, HistoryOp, HostHooks, NoopHooks};

/// Errors surfaced by the controller. The stacks are consistent whenever one
/// of these is returned.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("{kind} was not authorized")]
    Vetoed { kind: CommandKind },

    #[error("{op} is not allowed right now")]
    Locked { op: HistoryOp },

    #[error("failed to execute {kind}: {source}")]
    Execute {
        kind: CommandKind,
        #[source]
        source: CommandError,
    },

    #[error("failed to undo {kind}: {source}")]
    Undo {
        kind: CommandKind,
        #[source]
        source: CommandError,
    },

    #[error("failed to redo {kind}: {source}")]
    Redo {
        kind: CommandKind,
        #[source]
        source: CommandError,
    },
}

/// One row of the history browser, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    /// Oldest-first position in the undo stack (what `rewind_to` takes).
    pub index: usize,
    /// 1-based number shown to the user; the newest row has the highest.
    pub number: usize,
    pub description: String,
}

/// Manager for undo/redo history.
pub struct HistoryManager {
    /// Commands available for undo (newest at back).
    pub(super) undo_stack: VecDeque<Box<dyn UndoableCmd>>,
    /// Commands available for redo (next to redo at back).
    pub(super) redo_stack: VecDeque<Box<dyn UndoableCmd>>,
    pub(super) config: HistoryConfig,
    pub(super) hooks: Box<dyn HostHooks>,
}

impl fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryManager {
    /// Create a manager with no-op host hooks.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_hooks(config, NoopHooks)
    }

    #[must_use]
    pub fn with_hooks(config: HistoryConfig, hooks: impl HostHooks + 'static) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
            hooks: Box::new(hooks),
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Run a freshly constructed command and record it.
    ///
    /// The host gate runs first; a veto happens before any mutation. On
    /// success the command is pushed, the redo stack is cleared and a flush
    /// is requested unless the command is transient. On failure neither
    /// stack changes.
    pub fn execute_command(&mut self, mut cmd: Box<dyn UndoableCmd>) -> Result<(), HistoryError> {
        let kind = cmd.kind();
        let info = CommandInfo {
            kind,
            description: cmd.describe(),
            sensitive: kind.is_sensitive_edit(),
        };
        if !self.hooks.authorize(&info) {
            warn!(target: "seatlog.history", kind = %kind, "command vetoed by host");
            return Err(HistoryError::Vetoed { kind });
        }

        let start = Instant::now();
        match cmd.execute() {
            Ok(status) => {
                let flush = !cmd.is_transient() || self.config.persist_transient;
                self.undo_stack.push_back(cmd);
                self.redo_stack.clear();
                self.hooks.refresh();
                self.hooks.status(&status);
                if flush {
                    self.hooks.request_flush(FlushReason::CommandExecution);
                }
                self.hooks.record_activity();
                debug!(
                    target: "seatlog.history",
                    kind = %kind,
                    undo_depth = self.undo_stack.len(),
                    duration_us = start.elapsed().as_micros() as u64,
                    "command executed"
                );
                Ok(())
            }
            Err(source) => {
                error!(target: "seatlog.history", kind = %kind, reason = %source, "command failed");
                self.hooks
                    .notify_error("Command Error", &format!("Could not complete action: {source}"));
                Err(HistoryError::Execute { kind, source })
            }
        }
    }

    /// Undo the most recent command.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(status))` if undo succeeded
    /// - `Some(Err(_))` if undo failed (command remains on undo stack)
    /// - `None` if no commands to undo
    pub fn undo(&mut self) -> Option<Result<String, HistoryError>> {
        if self.undo_stack.is_empty() {
            return None;
        }
        if !self.hooks.authorize_history(HistoryOp::Undo) {
            return Some(Err(self.locked(HistoryOp::Undo)));
        }
        let mut cmd = self.undo_stack.pop_back()?;
        let kind = cmd.kind();

        match cmd.undo() {
            Ok(status) => {
                self.redo_stack.push_back(cmd);
                self.after_transition(&status, FlushReason::Undo);
                debug!(
                    target: "seatlog.history",
                    kind = %kind,
                    undo_depth = self.undo_stack.len(),
                    redo_depth = self.redo_stack.len(),
                    "undo"
                );
                Some(Ok(status))
            }
            Err(source) => {
                // Put back on undo stack
                self.undo_stack.push_back(cmd);
                error!(target: "seatlog.history", kind = %kind, reason = %source, "undo failed");
                self.hooks.status("Undo failed.");
                self.hooks
                    .notify_error("Undo Error", &format!("Could not undo last action: {source}"));
                Some(Err(HistoryError::Undo { kind, source }))
            }
        }
    }

    /// Redo the most recently undone command.
    ///
    /// Mirror image of [`undo`](Self::undo).
    pub fn redo(&mut self) -> Option<Result<String, HistoryError>> {
        if self.redo_stack.is_empty() {
            return None;
        }
        if !self.hooks.authorize_history(HistoryOp::Redo) {
            return Some(Err(self.locked(HistoryOp::Redo)));
        }
        let mut cmd = self.redo_stack.pop_back()?;
        let kind = cmd.kind();

        match cmd.redo() {
            Ok(status) => {
                self.undo_stack.push_back(cmd);
                self.after_transition(&status, FlushReason::Redo);
                debug!(
                    target: "seatlog.history",
                    kind = %kind,
                    undo_depth = self.undo_stack.len(),
                    redo_depth = self.redo_stack.len(),
                    "redo"
                );
                Some(Ok(status))
            }
            Err(source) => {
                // Put back on redo stack
                self.redo_stack.push_back(cmd);
                error!(target: "seatlog.history", kind = %kind, reason = %source, "redo failed");
                self.hooks.status("Redo failed.");
                self.hooks
                    .notify_error("Redo Error", &format!("Could not redo action: {source}"));
                Some(Err(HistoryError::Redo { kind, source }))
            }
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    #[must_use]
    pub fn next_undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|c| c.describe())
    }

    #[must_use]
    pub fn next_redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|c| c.describe())
    }

    /// Undo history, oldest first.
    pub fn undo_commands(&self) -> impl Iterator<Item = &dyn UndoableCmd> {
        self.undo_stack.iter().map(|c| &**c as &dyn UndoableCmd)
    }

    /// Redo history, bottom first (the next command to redo comes last).
    pub fn redo_commands(&self) -> impl Iterator<Item = &dyn UndoableCmd> {
        self.redo_stack.iter().map(|c| &**c as &dyn UndoableCmd)
    }

    /// Rows for the history browser, newest first.
    #[must_use]
    pub fn undo_listing(&self) -> Vec<HistoryRow> {
        self.undo_stack
            .iter()
            .enumerate()
            .rev()
            .map(|(index, cmd)| HistoryRow {
                index,
                number: index + 1,
                description: cmd.describe(),
            })
            .collect()
    }

    /// Convert a newest-first listing row into the oldest-first index that
    /// [`rewind_to`](Self::rewind_to) takes.
    #[must_use]
    pub fn index_for_listing_row(&self, row: usize) -> Option<usize> {
        row.checked_add(1)
            .and_then(|depth| self.undo_stack.len().checked_sub(depth))
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: HistoryConfig) {
        self.config = config;
    }

    /// Swap the host hooks, returning the old ones.
    pub fn replace_hooks(&mut self, hooks: impl HostHooks + 'static) -> Box<dyn HostHooks> {
        std::mem::replace(&mut self.hooks, Box::new(hooks))
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Clear all history (both undo and redo).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Replace both stacks wholesale (used when loading a snapshot). Both
    /// are given oldest/bottom first.
    pub fn replace_stacks(
        &mut self,
        undo: Vec<Box<dyn UndoableCmd>>,
        redo: Vec<Box<dyn UndoableCmd>>,
    ) {
        self.undo_stack = undo.into();
        self.redo_stack = redo.into();
    }

    fn after_transition(&mut self, status: &str, reason: FlushReason) {
        self.hooks.refresh();
        self.hooks.status(status);
        self.hooks.request_flush(reason);
        self.hooks.record_activity();
    }

    pub(super) fn locked(&mut self, op: HistoryOp) -> HistoryError {
        warn!(target: "seatlog.history", op = %op, "history operation refused by host");
        self.hooks.status(&format!("Cannot {op} while the application is locked."));
        HistoryError::Locked { op }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookCall, RecordingHooks};
    use crate::undo::testing::{Faulty, move_cmd};
    use crate::undo::variants::test_support::seeded_store;
    use crate::undo::variants::{LogAppendCmd, MarkLiveQuizQuestionCmd};
    use seatlog_core::{LogKind, LogRecord};

    fn recording() -> (HistoryManager, crate::hooks::HookLog) {
        let hooks = RecordingHooks::new();
        let log = hooks.log();
        (HistoryManager::with_hooks(HistoryConfig::default(), hooks), log)
    }

    #[test]
    fn test_new_manager() {
        let mut mgr = HistoryManager::default();
        assert!(!mgr.can_undo());
        assert!(!mgr.can_redo());
        assert_eq!(mgr.undo_depth(), 0);
        assert!(mgr.undo().is_none());
    }

    #[test]
    fn test_execute_undo_redo() {
        let store = seeded_store();
        let (mut mgr, log) = recording();
        mgr.execute_command(move_cmd(&store, "student_1", (10.0, 10.0), (50.0, 50.0)))
            .unwrap();
        assert_eq!(store.borrow().students["student_1"].x, 50.0);

        assert_eq!(mgr.undo().unwrap().unwrap(), "Undid move of 1 item(s).");
        assert_eq!(store.borrow().students["student_1"].x, 10.0);
        assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (0, 1));

        assert_eq!(mgr.redo().unwrap().unwrap(), "Moved 1 item(s).");
        assert_eq!(store.borrow().students["student_1"].x, 50.0);
        assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (1, 0));

        assert_eq!(
            log.flushes(),
            [
                FlushReason::CommandExecution,
                FlushReason::Undo,
                FlushReason::Redo
            ]
        );
        assert_eq!(log.count(&HookCall::Refresh), 3);
    }

    #[test]
    fn test_execute_clears_redo() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        mgr.execute_command(move_cmd(&store, "student_1", (10.0, 10.0), (20.0, 20.0)))
            .unwrap();
        mgr.execute_command(move_cmd(&store, "student_1", (20.0, 20.0), (30.0, 30.0)))
            .unwrap();
        mgr.undo().unwrap().unwrap();
        assert!(mgr.can_redo());

        mgr.execute_command(move_cmd(&store, "student_2", (200.0, 10.0), (0.0, 0.0)))
            .unwrap();
        assert!(!mgr.can_redo());
        assert_eq!(mgr.undo_depth(), 2);
    }

    #[test]
    fn test_failed_execute_leaves_stacks_alone() {
        let store = seeded_store();
        let (mut mgr, log) = recording();
        mgr.execute_command(move_cmd(&store, "student_1", (10.0, 10.0), (20.0, 20.0)))
            .unwrap();
        mgr.undo().unwrap().unwrap();

        let (cmd, faults) = Faulty::wrap(move_cmd(&store, "student_2", (200.0, 10.0), (5.0, 5.0)));
        faults.execute.set(true);
        let err = mgr.execute_command(cmd).unwrap_err();
        assert!(matches!(err, HistoryError::Execute { kind: CommandKind::MoveItems, .. }));
        assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (0, 1));
        assert!(log.calls().iter().any(|c| matches!(c, HookCall::Error { .. })));
    }

    #[test]
    fn test_failed_undo_pushes_back() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        let (cmd, faults) = Faulty::wrap(move_cmd(&store, "student_1", (10.0, 10.0), (20.0, 20.0)));
        mgr.execute_command(cmd).unwrap();

        faults.undo.set(true);
        let err = mgr.undo().unwrap().unwrap_err();
        assert!(matches!(err, HistoryError::Undo { .. }));
        assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (1, 0));

        faults.undo.set(false);
        mgr.undo().unwrap().unwrap();
        assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (0, 1));
    }

    #[test]
    fn test_failed_redo_pushes_back() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        let (cmd, faults) = Faulty::wrap(move_cmd(&store, "student_1", (10.0, 10.0), (20.0, 20.0)));
        mgr.execute_command(cmd).unwrap();
        mgr.undo().unwrap().unwrap();

        faults.execute.set(true);
        assert!(matches!(mgr.redo(), Some(Err(HistoryError::Redo { .. }))));
        assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (0, 1));
    }

    #[test]
    fn test_veto_happens_before_mutation() {
        let store = seeded_store();
        let mut hooks = RecordingHooks::new();
        hooks.deny_commands = true;
        let mut mgr = HistoryManager::with_hooks(HistoryConfig::default(), hooks);
        let before = store.borrow().clone();
        let err = mgr
            .execute_command(move_cmd(&store, "student_1", (10.0, 10.0), (90.0, 90.0)))
            .unwrap_err();
        assert!(matches!(err, HistoryError::Vetoed { .. }));
        assert_eq!(*store.borrow(), before);
        assert_eq!(mgr.undo_depth(), 0);
    }

    #[test]
    fn test_locked_history_refuses_undo() {
        let store = seeded_store();
        let mut hooks = RecordingHooks::new();
        hooks.locked = true;
        let mut mgr = HistoryManager::with_hooks(HistoryConfig::default(), hooks);
        mgr.execute_command(move_cmd(&store, "student_1", (10.0, 10.0), (20.0, 20.0)))
            .unwrap();
        assert!(matches!(
            mgr.undo(),
            Some(Err(HistoryError::Locked { op: HistoryOp::Undo }))
        ));
        assert_eq!(mgr.undo_depth(), 1);
    }

    #[test]
    fn test_transient_commands_skip_flush() {
        let store = seeded_store();
        let (mut mgr, log) = recording();
        mgr.execute_command(Box::new(MarkLiveQuizQuestionCmd::new(&store, "student_1", "correct")))
            .unwrap();
        assert!(log.flushes().is_empty());
        assert_eq!(log.count(&HookCall::Refresh), 1);

        mgr.set_config(HistoryConfig {
            persist_transient: true,
            ..HistoryConfig::default()
        });
        mgr.execute_command(Box::new(MarkLiveQuizQuestionCmd::new(&store, "student_1", "wrong")))
            .unwrap();
        assert_eq!(log.flushes(), [FlushReason::CommandExecution]);
    }

    #[test]
    fn test_listing_is_newest_first() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        mgr.execute_command(move_cmd(&store, "student_1", (10.0, 10.0), (20.0, 20.0)))
            .unwrap();
        let mut record = LogRecord::new("2024-02-01T10:00:00", "student_1", LogKind::Behavior, "Helping");
        record.student_first_name = Some("Ada".into());
        mgr.execute_command(Box::new(LogAppendCmd::new_behavior(&store, record)))
            .unwrap();

        let rows = mgr.undo_listing();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 2);
        assert_eq!(rows[0].description, "Log Behavior: 'Helping' for Ada");
        assert_eq!(rows[1].index, 0);
        assert_eq!(mgr.index_for_listing_row(0), Some(1));
        assert_eq!(mgr.index_for_listing_row(1), Some(0));
        assert_eq!(mgr.index_for_listing_row(2), None);
        assert_eq!(mgr.index_for_listing_row(usize::MAX), None);
        assert_eq!(
            mgr.next_undo_description().as_deref(),
            Some("Log Behavior: 'Helping' for Ada")
        );
    }

    #[test]
    fn test_listing_row_out_of_range_on_empty_history() {
        let mgr = HistoryManager::default();
        assert_eq!(mgr.index_for_listing_row(0), None);
        assert_eq!(mgr.index_for_listing_row(usize::MAX), None);
    }

    #[test]
    fn test_clear() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        mgr.execute_command(move_cmd(&store, "student_1", (10.0, 10.0), (20.0, 20.0)))
            .unwrap();
        mgr.execute_command(move_cmd(&store, "student_1", (20.0, 20.0), (30.0, 30.0)))
            .unwrap();
        mgr.undo().unwrap().unwrap();
        mgr.clear();
        assert!(!mgr.can_undo());
        assert!(!mgr.can_redo());
    }
}
