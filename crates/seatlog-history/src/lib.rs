#![forbid(unsafe_code)]

//! Seatlog History
//!
//! The reversible-command engine behind the seating-chart editor's undo,
//! redo and "revert to here" features.
//!
//! # Key Components
//!
//! - [`HistoryManager`] - Two-stack controller that executes, undoes and redoes commands
//! - [`UndoableCmd`] - Trait every reversible command implements
//! - [`HostHooks`] - Callbacks into the host for authorization, refresh, status and autosave
//! - [`HistorySnapshot`] / [`HistoryLoader`] - Persistence of both stacks across restarts
//! - [`HistoryConfig`] - Retention window and flush policy
//!
//! # Role in Seatlog
//! `seatlog-history` sits between the host application and
//! [`seatlog_core::ClassroomStore`]. The host builds a command for every
//! user action and hands it to the manager; the manager applies it to the
//! store, records it, and tells the host what to redraw and when to save.

pub mod config;
pub mod hooks;
pub mod undo;

pub use config::{ConfigError, HistoryConfig};
pub use hooks::{
    CommandInfo, FlushReason, HistoryOp, HookCall, HookLog, HostHooks, NoopHooks, RecordingHooks,
};
pub use undo::{
    CommandError, CommandKind, CommandMetadata, CommandResult, CommandSource, HistoryError,
    HistoryLoader, HistoryManager, HistoryRow, HistorySnapshot, LoadReport, PersistError,
    RewindError, RewindReport, UndoableCmd,
};
