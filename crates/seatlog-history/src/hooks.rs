#![forbid(unsafe_code)]

//! Host callbacks invoked by the history controller.
//!
//! The engine never draws, prompts or writes files itself. After each
//! transition it tells the host what happened through [`HostHooks`]; the host
//! decides how to refresh the view, where to show status text and when to
//! flush its data file.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::undo::CommandKind;

/// A history-level operation the host may refuse (for example while the
/// application is locked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOp {
    Undo,
    Redo,
    Rewind,
}

impl fmt::Display for HistoryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Rewind => "rewind",
        })
    }
}

/// Why the controller is asking the host to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    CommandExecution,
    Undo,
    Redo,
    Rewind,
}

impl FlushReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CommandExecution => "command_execution",
            Self::Undo => "undo_command",
            Self::Redo => "redo_command",
            Self::Rewind => "selective_rewind",
        }
    }
}

/// What the pre-execution gate sees about a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub kind: CommandKind,
    pub description: String,
    /// Kinds a host typically puts behind an edit password.
    pub sensitive: bool,
}

/// Callbacks into the host application.
///
/// Every method has a no-op default, so hosts implement only what they use.
pub trait HostHooks {
    /// Pre-condition gate run before any mutation. Returning `false` vetoes
    /// the command.
    fn authorize(&mut self, _command: &CommandInfo) -> bool {
        true
    }

    /// Gate for undo, redo and rewind.
    fn authorize_history(&mut self, _op: HistoryOp) -> bool {
        true
    }

    /// Redraw whatever depends on the store.
    fn refresh(&mut self) {}

    /// Show a one-line status message.
    fn status(&mut self, _message: &str) {}

    /// Show a blocking error to the user.
    fn notify_error(&mut self, _title: &str, _message: &str) {}

    /// Persist the store and the history. Fire-and-forget.
    fn request_flush(&mut self, _reason: FlushReason) {}

    /// Note user activity (resets an auto-lock timer, for example).
    fn record_activity(&mut self) {}
}

/// Hooks that do nothing and allow everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl HostHooks for NoopHooks {}

/// One recorded hook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    Refresh,
    Status(String),
    Error { title: String, message: String },
    Flush(FlushReason),
    Activity,
}

/// Shared log of hook calls, readable after the hooks were moved into a
/// controller.
#[derive(Debug, Clone, Default)]
pub struct HookLog(Rc<RefCell<Vec<HookCall>>>);

impl HookLog {
    #[must_use]
    pub fn calls(&self) -> Vec<HookCall> {
        self.0.borrow().clone()
    }

    #[must_use]
    pub fn statuses(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HookCall::Status(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn flushes(&self) -> Vec<FlushReason> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HookCall::Flush(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count(&self, call: &HookCall) -> usize {
        self.0.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, call: HookCall) {
        self.0.borrow_mut().push(call);
    }
}

/// Hooks that record every call, with switchable gates. Useful for hosts'
/// own tests as well as ours.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    log: HookLog,
    /// When set, [`HostHooks::authorize`] refuses every command.
    pub deny_commands: bool,
    /// When set, [`HostHooks::authorize_history`] refuses everything.
    pub locked: bool,
}

impl RecordingHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to the call log that stays valid after `self` is moved.
    #[must_use]
    pub fn log(&self) -> HookLog {
        self.log.clone()
    }
}

impl HostHooks for RecordingHooks {
    fn authorize(&mut self, _command: &CommandInfo) -> bool {
        !self.deny_commands
    }

    fn authorize_history(&mut self, _op: HistoryOp) -> bool {
        !self.locked
    }

    fn refresh(&mut self) {
        self.log.push(HookCall::Refresh);
    }

    fn status(&mut self, message: &str) {
        self.log.push(HookCall::Status(message.to_string()));
    }

    fn notify_error(&mut self, title: &str, message: &str) {
        self.log.push(HookCall::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn request_flush(&mut self, reason: FlushReason) {
        self.log.push(HookCall::Flush(reason));
    }

    fn record_activity(&mut self) {
        self.log.push(HookCall::Activity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_hooks_share_their_log() {
        let mut hooks = RecordingHooks::new();
        let log = hooks.log();
        hooks.status("Moved 1 item(s).");
        hooks.request_flush(FlushReason::Undo);
        hooks.refresh();
        assert_eq!(log.statuses(), ["Moved 1 item(s)."]);
        assert_eq!(log.flushes(), [FlushReason::Undo]);
        assert_eq!(log.count(&HookCall::Refresh), 1);
    }

    #[test]
    fn flush_reason_names() {
        assert_eq!(FlushReason::Rewind.as_str(), "selective_rewind");
        assert_eq!(FlushReason::CommandExecution.as_str(), "command_execution");
    }
}
