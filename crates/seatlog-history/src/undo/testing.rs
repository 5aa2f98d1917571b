#![forbid(unsafe_code)]

//! Test-only command helpers.

use std::cell::Cell;
use std::rc::Rc;

use seatlog_core::{EntityKind, SharedStore};
use serde_json::Value;

use super::command::{CommandError, CommandKind, CommandMetadata, CommandResult, UndoableCmd};
use super::variants::{ItemMove, MoveItemsCmd};

/// Switches that make a [`Faulty`] command fail on demand.
#[derive(Debug, Default)]
pub struct Faults {
    pub execute: Cell<bool>,
    pub undo: Cell<bool>,
}

/// Wraps a real command and fails before touching the store when the
/// matching switch is on.
pub struct Faulty {
    inner: Box<dyn UndoableCmd>,
    faults: Rc<Faults>,
}

impl Faulty {
    pub fn wrap(inner: Box<dyn UndoableCmd>) -> (Box<dyn UndoableCmd>, Rc<Faults>) {
        let faults = Rc::new(Faults::default());
        let cmd = Self {
            inner,
            faults: Rc::clone(&faults),
        };
        (Box::new(cmd), faults)
    }
}

impl UndoableCmd for Faulty {
    fn kind(&self) -> CommandKind {
        self.inner.kind()
    }

    fn metadata(&self) -> &CommandMetadata {
        self.inner.metadata()
    }

    fn execute(&mut self) -> CommandResult {
        if self.faults.execute.get() {
            return Err(CommandError::InvalidState("injected execute fault".into()));
        }
        self.inner.execute()
    }

    fn undo(&mut self) -> CommandResult {
        if self.faults.undo.get() {
            return Err(CommandError::InvalidState("injected undo fault".into()));
        }
        self.inner.undo()
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn payload(&self) -> Result<Value, CommandError> {
        self.inner.payload()
    }
}

/// Move one student from `from` to `to`.
pub fn move_cmd(
    store: &SharedStore,
    id: &str,
    from: (f64, f64),
    to: (f64, f64),
) -> Box<dyn UndoableCmd> {
    Box::new(MoveItemsCmd::new(
        store,
        vec![ItemMove {
            id: id.to_string(),
            item_type: EntityKind::Student,
            old_x: from.0,
            old_y: from.1,
            new_x: to.0,
            new_y: to.1,
        }],
    ))
}
