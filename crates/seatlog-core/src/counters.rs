#![forbid(unsafe_code)]

//! Monotonic id counters with rollback.

use serde::{Deserialize, Serialize};

/// Which counter an id is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Student,
    Furniture,
    Group,
    Guide,
}

impl CounterKind {
    /// Prefix used when formatting an allocated number as an id.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Furniture => "furniture",
            Self::Group => "group",
            Self::Guide => "guide",
        }
    }
}

/// The next free number for each id space.
///
/// Commands that create entities record the counter value before and after
/// allocation so undo can roll it back exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub student: u64,
    pub furniture: u64,
    pub group: u64,
    pub guide: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            student: 1,
            furniture: 1,
            group: 1,
            guide: 1,
        }
    }
}

impl IdCounters {
    /// The number the next allocation will return.
    #[must_use]
    pub fn peek(&self, kind: CounterKind) -> u64 {
        *self.slot(kind)
    }

    /// Take the next number and advance the counter.
    pub fn allocate(&mut self, kind: CounterKind) -> u64 {
        let slot = self.slot_mut(kind);
        let n = *slot;
        *slot += 1;
        n
    }

    /// Reset a counter to a previously observed value.
    pub fn rollback(&mut self, kind: CounterKind, value: u64) {
        *self.slot_mut(kind) = value;
    }

    /// Format an allocated number as an id (`student_7`).
    #[must_use]
    pub fn format_id(kind: CounterKind, n: u64) -> String {
        format!("{}_{n}", kind.prefix())
    }

    fn slot(&self, kind: CounterKind) -> &u64 {
        match kind {
            CounterKind::Student => &self.student,
            CounterKind::Furniture => &self.furniture,
            CounterKind::Group => &self.group,
            CounterKind::Guide => &self.guide,
        }
    }

    fn slot_mut(&mut self, kind: CounterKind) -> &mut u64 {
        match kind {
            CounterKind::Student => &mut self.student,
            CounterKind::Furniture => &mut self.furniture,
            CounterKind::Group => &mut self.group,
            CounterKind::Guide => &mut self.guide,
        }
    }
}
