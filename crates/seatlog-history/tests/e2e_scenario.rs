#![forbid(unsafe_code)]

//! End-to-end walk through create, move, delete, undo, redo and rewind
//! against a real store, with recording host hooks.
//!
//! Run:
//!   cargo test -p seatlog-history --test e2e_scenario

use seatlog_core::{ClassroomStore, Entity, EntityKind, LogBook, LogKind, LogRecord, SharedStore};
use seatlog_history::undo::{AddItemCmd, DeleteItemCmd, ItemMove, MoveItemsCmd};
use seatlog_history::{FlushReason, HistoryConfig, HistoryManager, RecordingHooks};

// ============================================================================
// Helpers
// ============================================================================

fn position(store: &SharedStore, id: &str) -> Option<(f64, f64)> {
    store
        .borrow()
        .entity(EntityKind::Student, id)
        .map(|e| (e.x, e.y))
}

fn log_count(store: &SharedStore, id: &str) -> usize {
    let s = store.borrow();
    s.log(LogBook::Behavior)
        .iter()
        .chain(s.log(LogBook::Homework))
        .filter(|r| r.student_id == id)
        .count()
}

fn descriptions(mgr: &HistoryManager) -> Vec<String> {
    mgr.undo_commands().map(|c| c.describe()).collect()
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn create_move_delete_then_walk_back() {
    let store = ClassroomStore::new().shared();
    let hooks = RecordingHooks::new();
    let log = hooks.log();
    let mut mgr = HistoryManager::with_hooks(HistoryConfig::default(), hooks);

    // A: create S1 at (10, 10).
    let add = AddItemCmd::allocate(
        &store,
        EntityKind::Student,
        Entity::new("", "Sam Okafor", 10.0, 10.0).with_first_name("Sam"),
    );
    let id = add.item_id().to_string();
    assert_eq!(id, "student_1");
    mgr.execute_command(Box::new(add)).unwrap();
    assert_eq!(position(&store, &id), Some((10.0, 10.0)));
    assert_eq!(store.borrow().counters.student, 2);

    // The host records a couple of log entries for S1 outside history.
    {
        let mut s = store.borrow_mut();
        s.append_log(
            LogBook::Behavior,
            LogRecord::new("2025-02-03T09:00:00", &id, LogKind::Behavior, "Talking"),
        );
        s.append_log(
            LogBook::Homework,
            LogRecord::new("2025-02-03T09:05:00", &id, LogKind::Homework, "Reading"),
        );
    }

    // B: move S1 to (50, 50).
    let mv = MoveItemsCmd::new(
        &store,
        vec![ItemMove {
            id: id.clone(),
            item_type: EntityKind::Student,
            old_x: 10.0,
            old_y: 10.0,
            new_x: 50.0,
            new_y: 50.0,
        }],
    );
    mgr.execute_command(Box::new(mv)).unwrap();
    assert_eq!(position(&store, &id), Some((50.0, 50.0)));

    // C: delete S1 and its logs.
    let del = DeleteItemCmd::capture(&store, EntityKind::Student, &id).unwrap();
    mgr.execute_command(Box::new(del)).unwrap();
    assert_eq!(position(&store, &id), None);
    assert_eq!(log_count(&store, &id), 0);
    assert_eq!(mgr.undo_depth(), 3);

    // Undo C: S1 is back where B left it, with its logs.
    mgr.undo().unwrap().unwrap();
    assert_eq!(position(&store, &id), Some((50.0, 50.0)));
    assert_eq!(log_count(&store, &id), 2);

    // Undo B.
    mgr.undo().unwrap().unwrap();
    assert_eq!(position(&store, &id), Some((10.0, 10.0)));

    // Undo A: S1 is gone and the id counter is rolled back.
    mgr.undo().unwrap().unwrap();
    assert_eq!(position(&store, &id), None);
    assert_eq!(store.borrow().counters.student, 1);
    assert!(mgr.undo().is_none());

    // Redo A.
    mgr.redo().unwrap().unwrap();
    assert_eq!(position(&store, &id), Some((10.0, 10.0)));
    assert_eq!((mgr.undo_depth(), mgr.redo_depth()), (1, 2));

    // Rewind to A: the future (B and C on redo) is discarded.
    let report = mgr.rewind_to(0).unwrap();
    assert_eq!(report.discarded, 0);
    assert_eq!(report.redo_discarded, 2);
    assert_eq!(descriptions(&mgr), ["Add student: Sam Okafor"]);
    assert_eq!(mgr.redo_depth(), 0);
    assert_eq!(position(&store, &id), Some((10.0, 10.0)));

    let flushes = log.flushes();
    assert_eq!(
        flushes,
        [
            FlushReason::CommandExecution,
            FlushReason::CommandExecution,
            FlushReason::CommandExecution,
            FlushReason::Undo,
            FlushReason::Undo,
            FlushReason::Undo,
            FlushReason::Redo,
            FlushReason::Rewind,
        ]
    );
    assert_eq!(
        log.statuses().last().map(String::as_str),
        Some("Reverted to: Add student: Sam Okafor. 0 later action(s) discarded.")
    );
}

#[test]
fn rewind_from_the_middle_discards_later_commands() {
    let store = ClassroomStore::new().shared();
    let mut mgr = HistoryManager::default();

    let add = AddItemCmd::allocate(
        &store,
        EntityKind::Student,
        Entity::new("", "Mina Park", 0.0, 0.0),
    );
    let id = add.item_id().to_string();
    mgr.execute_command(Box::new(add)).unwrap();

    let mut at = (0.0, 0.0);
    for step in 1..=3 {
        let to = (f64::from(step) * 25.0, 5.0);
        let mv = MoveItemsCmd::new(
            &store,
            vec![ItemMove {
                id: id.clone(),
                item_type: EntityKind::Student,
                old_x: at.0,
                old_y: at.1,
                new_x: to.0,
                new_y: to.1,
            }],
        );
        mgr.execute_command(Box::new(mv)).unwrap();
        at = to;
    }
    mgr.undo().unwrap().unwrap();
    assert_eq!(position(&store, &id), Some((50.0, 5.0)));

    // Listing row 1 is the second-newest undo entry: the first move.
    let listing = mgr.undo_listing();
    assert_eq!(listing.len(), 3);
    assert_eq!(listing[0].number, 3);
    let target = mgr.index_for_listing_row(1).unwrap();
    assert_eq!(target, 1);

    let report = mgr.rewind_to(target).unwrap();
    assert_eq!((report.discarded, report.redo_discarded), (1, 1));
    assert_eq!(mgr.undo_depth(), 2);
    assert!(!mgr.can_redo());
    assert_eq!(position(&store, &id), Some((25.0, 5.0)));
}
