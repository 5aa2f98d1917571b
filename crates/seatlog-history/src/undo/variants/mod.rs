#![forbid(unsafe_code)]

//! Built-in command variants.
//!
//! Every variant stores a [`SharedStore`] handle, its [`CommandMetadata`] and
//! a serde payload struct. The payload field names are the persisted wire
//! format and must not be renamed.

pub mod groups;
pub mod guides;
pub mod items;
pub mod live;
pub mod logs;
pub mod settings;
pub mod style;

use seatlog_core::SharedStore;
use serde::de::DeserializeOwned;

use super::command::{CommandMetadata, UndoableCmd};

pub use groups::{ManageStudentGroupCmd, ManageStudentGroupPayload, PriorSetting};
pub use guides::{
    AddGuideCmd, AddGuidePayload, DeleteGuideCmd, DeleteGuidePayload, GuideMove, MoveGuideCmd,
    MoveGuidePayload,
};
pub use items::{
    AddItemCmd, AddItemPayload, ChangeItemsSizeCmd, ChangeItemsSizePayload, DeleteItemCmd,
    DeleteItemPayload, EditItemCmd, EditItemPayload, ItemMove, ItemResize, MoveItemsCmd,
    MoveItemsPayload, PriorStyle,
};
pub use live::{
    HomeworkActions, MarkLiveHomeworkCmd, MarkLiveHomeworkPayload, MarkLiveQuizQuestionCmd,
    MarkLiveQuizQuestionPayload, SessionMode,
};
pub use logs::{LogAppendCmd, LogPayload};
pub use settings::{ResetSettingsCmd, ResetSettingsPayload};
pub use style::{ChangeStudentStyleCmd, ChangeStudentStylePayload};

/// A variant that can be rebuilt from its persisted payload.
pub(crate) trait Restorable: UndoableCmd + Sized + 'static {
    type Payload: DeserializeOwned;

    fn from_parts(store: SharedStore, payload: Self::Payload, metadata: CommandMetadata) -> Self;
}

/// "a, b, c..." for status lines; at most three names.
pub(crate) fn summarize_names(names: &[String]) -> String {
    let head = names.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    if names.len() > 3 {
        format!("{head}...")
    } else {
        head
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use seatlog_core::{ClassroomStore, Entity, EntityKind, SharedStore};

    /// A store with two students and one desk.
    pub fn seeded_store() -> SharedStore {
        let mut store = ClassroomStore::new();
        store.upsert_entity(
            EntityKind::Student,
            "student_1",
            Entity::new("student_1", "Ada Lovelace", 10.0, 10.0)
                .with_first_name("Ada")
                .with_size(130.0, 80.0),
        );
        store.upsert_entity(
            EntityKind::Student,
            "student_2",
            Entity::new("student_2", "Alan Turing", 200.0, 10.0)
                .with_first_name("Alan")
                .with_size(130.0, 80.0),
        );
        store.upsert_entity(
            EntityKind::Furniture,
            "furniture_1",
            Entity::new("furniture_1", "Teacher's Desk", 400.0, 300.0).with_size(200.0, 100.0),
        );
        store.counters.student = 3;
        store.counters.furniture = 2;
        store.shared()
    }
}
