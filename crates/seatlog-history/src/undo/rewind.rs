#![forbid(unsafe_code)]

//! Selective rewind: collapse history to an earlier command and discard the
//! future.
//!
//! Given target `T` in an undo stack of length `N`:
//!
//! ```text
//! before       Undo: [A, B, C, D]   Redo: [X]        rewind_to(1)
//! phase A      undo D, undo C       displaced = [D, C]
//! phase B      undo B, execute B
//! after        Undo: [A, B]         Redo: []         C, D, X discarded
//! ```
//!
//! There is one linear timeline; nothing discarded here can be recovered.
//!
//! # Failure Modes
//!
//! - **Phase A undo fails**: the failed command is pushed back, displaced
//!   commands are re-applied oldest first and pushed back. No net change.
//! - **Target undo fails**: handled like a phase A failure.
//! - **Target re-execute fails**: the target and the displaced commands are
//!   parked on the redo stack in replay order, which matches the store.
//! - **A rollback re-apply fails**: that command and every newer displaced
//!   command are parked on the redo stack, likewise matching the store.

use thiserror::Error;
use tracing::{error, info, info_span};
use web_time::Instant;

use super::command::{CommandError, CommandKind, UndoableCmd};
use super::history::HistoryManager;
use crate::hooks::{FlushReason, HistoryOp};

#[derive(Debug, Error)]
pub enum RewindError {
    #[error("rewind target {index} is out of range for {len} command(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("rewind is not allowed right now")]
    Locked,

    /// A later command could not be undone. Nothing changed unless a
    /// rollback re-apply also failed (see `restored`).
    #[error("rewind aborted: could not undo {failed_kind} ({restored} command(s) restored): {source}")]
    PhaseA {
        failed_kind: CommandKind,
        restored: usize,
        #[source]
        source: CommandError,
    },

    #[error("rewind target {kind} failed: {source}")]
    PhaseB {
        kind: CommandKind,
        #[source]
        source: CommandError,
    },
}

/// Outcome of a successful rewind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewindReport {
    pub target_index: usize,
    /// Later undo-history commands that were undone and dropped.
    pub discarded: usize,
    /// Redo-history commands that were dropped.
    pub redo_discarded: usize,
    pub description: String,
}

impl HistoryManager {
    /// Rewind to the command at oldest-first `target` in the undo history.
    ///
    /// On success the undo history holds exactly `target + 1` commands and
    /// the redo history is empty.
    pub fn rewind_to(&mut self, target: usize) -> Result<RewindReport, RewindError> {
        let len = self.undo_stack.len();
        if target >= len {
            return Err(RewindError::IndexOutOfRange { index: target, len });
        }
        if !self.hooks.authorize_history(HistoryOp::Rewind) {
            self.locked(HistoryOp::Rewind);
            return Err(RewindError::Locked);
        }

        let k = len - 1 - target;
        let start = Instant::now();
        let span = info_span!(
            "history.rewind",
            target_index = target,
            displaced = k,
            duration_us = tracing::field::Empty
        )
        .entered();

        // Phase A: undo the K most recent commands, newest first.
        let mut displaced: Vec<Box<dyn UndoableCmd>> = Vec::with_capacity(k);
        for _ in 0..k {
            let Some(mut cmd) = self.undo_stack.pop_back() else {
                break;
            };
            if let Err(source) = cmd.undo() {
                let failed_kind = cmd.kind();
                self.undo_stack.push_back(cmd);
                let restored = self.roll_back_displaced(displaced);
                return Err(self.rewind_failed(RewindError::PhaseA {
                    failed_kind,
                    restored,
                    source,
                }));
            }
            displaced.push(cmd);
        }

        // Phase B: the target is on top. Undo it, then run it forward again.
        let Some(mut target_cmd) = self.undo_stack.pop_back() else {
            let len = self.undo_stack.len() + displaced.len();
            self.roll_back_displaced(displaced);
            return Err(RewindError::IndexOutOfRange { index: target, len });
        };
        let kind = target_cmd.kind();
        if let Err(source) = target_cmd.undo() {
            self.undo_stack.push_back(target_cmd);
            self.roll_back_displaced(displaced);
            return Err(self.rewind_failed(RewindError::PhaseB { kind, source }));
        }
        if let Err(source) = target_cmd.execute() {
            // Everything from the target on is undone: park it for redo.
            self.redo_stack.extend(displaced);
            self.redo_stack.push_back(target_cmd);
            return Err(self.rewind_failed(RewindError::PhaseB { kind, source }));
        }

        let description = target_cmd.describe();
        self.undo_stack.push_back(target_cmd);
        let redo_discarded = self.redo_stack.len();
        self.redo_stack.clear();
        drop(displaced);

        self.hooks.refresh();
        self.hooks.status(&format!(
            "Reverted to: {description}. {k} later action(s) discarded."
        ));
        self.hooks.request_flush(FlushReason::Rewind);
        self.hooks.record_activity();

        let duration_us = start.elapsed().as_micros() as u64;
        span.record("duration_us", duration_us);
        info!(
            target: "seatlog.rewind",
            kind = %kind,
            index = target,
            discarded = k,
            redo_discarded,
            duration_us,
            "selective rewind complete"
        );

        Ok(RewindReport {
            target_index: target,
            discarded: k,
            redo_discarded,
            description,
        })
    }

    /// Re-apply displaced commands (given newest first) oldest first and push
    /// them back. Returns how many were restored to the undo stack.
    fn roll_back_displaced(&mut self, displaced: Vec<Box<dyn UndoableCmd>>) -> usize {
        let mut restored = 0;
        let mut oldest_first = displaced.into_iter().rev();
        while let Some(mut cmd) = oldest_first.next() {
            match cmd.redo() {
                Ok(_) => {
                    self.undo_stack.push_back(cmd);
                    restored += 1;
                }
                Err(source) => {
                    error!(
                        target: "seatlog.rewind",
                        kind = %cmd.kind(),
                        reason = %source,
                        "rollback re-apply failed; parking remaining commands on redo"
                    );
                    let newer: Vec<_> = oldest_first.collect();
                    self.redo_stack.extend(newer.into_iter().rev());
                    self.redo_stack.push_back(cmd);
                    break;
                }
            }
        }
        restored
    }

    fn rewind_failed(&mut self, err: RewindError) -> RewindError {
        error!(target: "seatlog.rewind", reason = %err, "selective rewind failed");
        self.hooks.refresh();
        self.hooks.status("Selective rewind failed.");
        self.hooks.notify_error("Rewind Error", &err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryConfig;
    use crate::hooks::RecordingHooks;
    use crate::undo::testing::{Faulty, move_cmd};
    use crate::undo::variants::test_support::seeded_store;
    use seatlog_core::SharedStore;

    fn pos(store: &SharedStore) -> (f64, f64) {
        let s = store.borrow();
        let e = &s.students["student_1"];
        (e.x, e.y)
    }

    /// A, B, C, D each move student_1 one step: 10 -> 20 -> 30 -> 40 -> 50.
    fn four_moves(
        store: &SharedStore,
        mgr: &mut HistoryManager,
    ) -> Vec<std::rc::Rc<crate::undo::testing::Faults>> {
        let mut faults = Vec::new();
        for step in 0..4 {
            let from = 10.0 + 10.0 * f64::from(step);
            let (cmd, f) = Faulty::wrap(move_cmd(store, "student_1", (from, from), (from + 10.0, from + 10.0)));
            mgr.execute_command(cmd).unwrap();
            faults.push(f);
        }
        faults
    }

    #[test]
    fn test_rewind_collapses_future() {
        let store = seeded_store();
        let hooks = RecordingHooks::new();
        let log = hooks.log();
        let mut mgr = HistoryManager::with_hooks(HistoryConfig::default(), hooks);
        four_moves(&store, &mut mgr);
        mgr.undo().unwrap().unwrap(); // D onto redo

        // Undo: [A, B, C], Redo: [D]
        let report = mgr.rewind_to(1).unwrap();
        assert_eq!(report.discarded, 1);
        assert_eq!(report.redo_discarded, 1);
        assert_eq!(mgr.undo_depth(), 2);
        assert_eq!(mgr.redo_depth(), 0);
        assert_eq!(pos(&store), (30.0, 30.0));
        assert_eq!(
            log.statuses().last().map(String::as_str),
            Some("Reverted to: Move 1 item(s). 1 later action(s) discarded.")
        );
        assert_eq!(log.flushes().last(), Some(&FlushReason::Rewind));
    }

    #[test]
    fn test_rewind_to_top_only_reapplies() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        four_moves(&store, &mut mgr);
        let report = mgr.rewind_to(3).unwrap();
        assert_eq!(report.discarded, 0);
        assert_eq!(mgr.undo_depth(), 4);
        assert_eq!(pos(&store), (50.0, 50.0));
    }

    #[test]
    fn test_rewind_out_of_range() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        four_moves(&store, &mut mgr);
        assert!(matches!(
            mgr.rewind_to(4),
            Err(RewindError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert!(matches!(
            HistoryManager::default().rewind_to(0),
            Err(RewindError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_phase_a_failure_is_a_no_op() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        let faults = four_moves(&store, &mut mgr);
        mgr.execute_command(move_cmd(&store, "student_2", (200.0, 10.0), (210.0, 10.0)))
            .unwrap();
        mgr.undo().unwrap().unwrap();
        let before = store.borrow().clone();

        faults[2].undo.set(true); // C
        let err = mgr.rewind_to(0).unwrap_err();
        assert!(matches!(err, RewindError::PhaseA { restored: 1, .. }));
        assert_eq!(mgr.undo_depth(), 4);
        assert_eq!(mgr.redo_depth(), 1);
        assert_eq!(*store.borrow(), before);
    }

    #[test]
    fn test_failed_rollback_parks_on_redo() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        let faults = four_moves(&store, &mut mgr);

        faults[2].undo.set(true); // C cannot be undone
        faults[3].execute.set(true); // D cannot be re-applied
        let err = mgr.rewind_to(0).unwrap_err();
        assert!(matches!(err, RewindError::PhaseA { restored: 0, .. }));
        assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (3, 1));
        assert_eq!(pos(&store), (40.0, 40.0));

        faults[3].execute.set(false);
        mgr.redo().unwrap().unwrap();
        assert_eq!(pos(&store), (50.0, 50.0));
    }

    #[test]
    fn test_target_undo_failure_restores_everything() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        let faults = four_moves(&store, &mut mgr);
        faults[1].undo.set(true); // B

        let err = mgr.rewind_to(1).unwrap_err();
        assert!(matches!(err, RewindError::PhaseB { .. }));
        assert_eq!(mgr.undo_depth(), 4);
        assert_eq!(pos(&store), (50.0, 50.0));
    }

    #[test]
    fn test_target_execute_failure_parks_in_replay_order() {
        let store = seeded_store();
        let mut mgr = HistoryManager::default();
        let faults = four_moves(&store, &mut mgr);
        faults[1].execute.set(true); // B

        let err = mgr.rewind_to(1).unwrap_err();
        assert!(matches!(err, RewindError::PhaseB { .. }));
        assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (1, 3));
        assert_eq!(pos(&store), (20.0, 20.0));

        faults[1].execute.set(false);
        for expected in [30.0, 40.0, 50.0] {
            mgr.redo().unwrap().unwrap();
            assert_eq!(pos(&store), (expected, expected));
        }
    }

    #[test]
    fn test_locked_rewind_changes_nothing() {
        let store = seeded_store();
        let mut hooks = RecordingHooks::new();
        hooks.locked = true;
        let mut mgr = HistoryManager::with_hooks(HistoryConfig::default(), hooks);
        four_moves(&store, &mut mgr);
        assert!(matches!(mgr.rewind_to(0), Err(RewindError::Locked)));
        assert_eq!(mgr.undo_depth(), 4);
    }
}
