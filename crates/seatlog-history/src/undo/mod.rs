#![forbid(unsafe_code)]

//! Reversible command history for the classroom store.
//!
//! Every user-initiated mutation of a [`ClassroomStore`](seatlog_core::ClassroomStore)
//! is wrapped in a command that knows how to apply and revert itself. The
//! [`HistoryManager`] keeps two stacks of those commands:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      HistoryManager                       │
//! │  ┌──────────────────┐            ┌──────────────────┐     │
//! │  │   Undo Stack     │            │   Redo Stack     │     │
//! │  │  ┌────────────┐  │   undo()   │  ┌────────────┐  │     │
//! │  │  │ newest     │  │ ────────►  │  │ last undone│  │     │
//! │  │  ├────────────┤  │            │  ├────────────┤  │     │
//! │  │  │ ...        │  │  ◄──────── │  │ ...        │  │     │
//! │  │  ├────────────┤  │   redo()   │  └────────────┘  │     │
//! │  │  │ oldest     │  │            │                  │     │
//! │  │  └────────────┘  │            └──────────────────┘     │
//! │  └──────────────────┘                                     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use seatlog_history::undo::{HistoryManager, MoveItemsCmd, ItemMove};
//!
//! let mut history = HistoryManager::default();
//! let cmd = MoveItemsCmd::new(&store, vec![ItemMove { /* ... */ }]);
//! history.execute_command(Box::new(cmd))?;
//!
//! history.undo();
//! history.redo();
//!
//! // Revert to the state right after the oldest command.
//! history.rewind_to(0)?;
//! ```
//!
//! # Module Structure
//!
//! - [`command`]: the [`UndoableCmd`] trait, [`CommandKind`] and metadata
//! - [`variants`]: the built-in commands
//! - [`history`]: the two-stack [`HistoryManager`]
//! - [`rewind`]: selective rewind to an arbitrary undo-stack entry
//! - [`registry`]: kind tag to constructor lookup for persisted entries
//! - [`persistence`]: snapshot save and tolerant load
//!
//! # Failure Handling
//!
//! A command that fails to undo or redo is pushed back where it came from,
//! so the stacks always describe the store. Rewind failures park commands
//! on the redo stack instead of dropping them.

pub mod command;
pub mod history;
pub mod persistence;
pub mod registry;
pub mod rewind;
pub mod variants;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{
    CommandError, CommandKind, CommandMetadata, CommandResult, CommandSource, UndoableCmd,
};
pub use history::{HistoryError, HistoryManager, HistoryRow};
pub use persistence::{
    HistoryLoader, HistorySnapshot, LoadReport, PersistError, PersistedEntry, SkippedEntry,
    StackSide,
};
pub use registry::{Constructor, RegistryError, constructor, reconstruct};
pub use rewind::{RewindError, RewindReport};
pub use variants::*;
