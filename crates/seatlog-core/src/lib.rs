#![forbid(unsafe_code)]

//! Seatlog Core
//!
//! The in-memory classroom domain store that every reversible command in
//! `seatlog-history` mutates. It owns the seating-chart entities (students
//! and furniture), layout guides, the two ordered log books, student groups,
//! live-session tallies, settings, and the id counters.
//!
//! # Role in Seatlog
//! `seatlog-core` knows nothing about commands or history. It exposes the
//! small set of primitive operations the history engine calls into:
//!
//! - upsert / remove an entity by id
//! - append to an ordered log, remove by identity or by field match
//! - patch a sparse style-override map
//! - replace the whole settings map
//! - allocate ids from a counter that can be rolled back
//!
//! The store is single-threaded. Hosts share it with commands through
//! [`SharedStore`], an `Rc<RefCell<_>>` handle.

pub mod counters;
pub mod entity;
pub mod log;
pub mod settings;
pub mod store;

pub use counters::{CounterKind, IdCounters};
pub use entity::{Entity, EntityKind, Group, Guide, GuideOrientation};
pub use log::{LogBook, LogKind, LogRecord, LogRemoval};
pub use settings::Settings;
pub use store::{ClassroomStore, QuizTally, SharedStore};
