#![forbid(unsafe_code)]

//! Live-session marks. Both kinds here are transient: they refresh the view
//! but never request a persistence flush.

use std::collections::BTreeMap;
use std::rc::Rc;

use seatlog_core::{EntityKind, QuizTally, SharedStore};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Restorable, capitalize};
use crate::undo::command::{
    CommandError, CommandKind, CommandMetadata, CommandResult, UndoableCmd, to_payload,
};

// ============================================================================
// Quiz tally
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkLiveQuizQuestionPayload {
    pub student_id: String,
    /// `"correct"` counts toward the score; anything else only toward the total.
    pub action_taken: String,
    #[serde(default)]
    pub previous_student_score_state: Option<QuizTally>,
}

pub struct MarkLiveQuizQuestionCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: MarkLiveQuizQuestionPayload,
}

impl MarkLiveQuizQuestionCmd {
    #[must_use]
    pub fn new(store: &SharedStore, student_id: &str, action: &str) -> Self {
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: MarkLiveQuizQuestionPayload {
                student_id: student_id.to_string(),
                action_taken: action.to_string(),
                previous_student_score_state: None,
            },
        }
    }

    fn is_correct(&self) -> bool {
        self.payload.action_taken == "correct"
    }
}

impl UndoableCmd for MarkLiveQuizQuestionCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::MarkLiveQuizQuestion
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let correct = self.is_correct();
        let p = &mut self.payload;
        let mut store = self.store.borrow_mut();
        if store.entity(EntityKind::Student, &p.student_id).is_none() {
            return Err(CommandError::missing(EntityKind::Student, &p.student_id));
        }
        let current = store
            .live_quiz_scores
            .get(&p.student_id)
            .copied()
            .unwrap_or_default();
        p.previous_student_score_state.get_or_insert(current);

        let next = QuizTally {
            correct: current.correct + u32::from(correct),
            total_asked: current.total_asked + 1,
        };
        store.live_quiz_scores.insert(p.student_id.clone(), next);
        Ok(format!(
            "Live Quiz: '{}' for {}. Score: {}/{}",
            capitalize(&p.action_taken),
            store.student_name(&p.student_id),
            next.correct,
            next.total_asked
        ))
    }

    fn undo(&mut self) -> CommandResult {
        let correct = self.is_correct();
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        match p.previous_student_score_state {
            Some(prev) if prev.is_empty() => {
                store.live_quiz_scores.remove(&p.student_id);
            }
            Some(prev) => {
                store.live_quiz_scores.insert(p.student_id.clone(), prev);
            }
            None => {
                // Entries persisted without a captured tally.
                if let Some(tally) = store.live_quiz_scores.get_mut(&p.student_id) {
                    tally.total_asked = tally.total_asked.saturating_sub(1);
                    if correct {
                        tally.correct = tally.correct.saturating_sub(1);
                    }
                    if tally.total_asked == 0 {
                        store.live_quiz_scores.remove(&p.student_id);
                    }
                }
            }
        }
        let name = store.student_name(&p.student_id);
        Ok(match store.live_quiz_scores.get(&p.student_id) {
            Some(t) => format!(
                "Undo Live Quiz Mark for {name}. Score: {}/{}",
                t.correct, t.total_asked
            ),
            None => format!("Undo Live Quiz Mark for {name}. No questions marked."),
        })
    }

    fn describe(&self) -> String {
        let store = self.store.borrow();
        let who = store
            .entity(EntityKind::Student, &self.payload.student_id)
            .map_or("Unknown", |s| s.short_name());
        format!("Mark Quiz: {} for {who}", self.payload.action_taken)
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for MarkLiveQuizQuestionCmd {
    type Payload = MarkLiveQuizQuestionPayload;

    fn from_parts(
        store: SharedStore,
        payload: MarkLiveQuizQuestionPayload,
        metadata: CommandMetadata,
    ) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}

// ============================================================================
// Homework marks
// ============================================================================

/// How the live homework session records marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// One status per homework type (`{"Reading": "yes"}`).
    #[serde(rename = "Yes/No")]
    YesNo,
    /// A list of selected options.
    #[serde(rename = "Select")]
    Select,
}

impl SessionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YesNo => "Yes/No",
            Self::Select => "Select",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HomeworkActions {
    Statuses(BTreeMap<String, Value>),
    Selected(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkLiveHomeworkPayload {
    pub student_id: String,
    pub homework_actions: HomeworkActions,
    pub session_mode: SessionMode,
    #[serde(default)]
    pub previous_homework_state: Option<BTreeMap<String, Value>>,
}

pub struct MarkLiveHomeworkCmd {
    store: SharedStore,
    metadata: CommandMetadata,
    payload: MarkLiveHomeworkPayload,
}

impl MarkLiveHomeworkCmd {
    #[must_use]
    pub fn new(
        store: &SharedStore,
        student_id: &str,
        actions: HomeworkActions,
        mode: SessionMode,
    ) -> Self {
        Self {
            store: Rc::clone(store),
            metadata: CommandMetadata::now(),
            payload: MarkLiveHomeworkPayload {
                student_id: student_id.to_string(),
                homework_actions: actions,
                session_mode: mode,
                previous_homework_state: None,
            },
        }
    }
}

impl UndoableCmd for MarkLiveHomeworkCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::MarkLiveHomework
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn execute(&mut self) -> CommandResult {
        let p = &mut self.payload;
        let mut store = self.store.borrow_mut();
        if store.entity(EntityKind::Student, &p.student_id).is_none() {
            return Err(CommandError::missing(EntityKind::Student, &p.student_id));
        }
        let mut marks = store
            .live_homework
            .get(&p.student_id)
            .cloned()
            .unwrap_or_default();
        match (p.session_mode, &p.homework_actions) {
            (SessionMode::YesNo, HomeworkActions::Statuses(statuses)) => {
                marks.extend(statuses.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            (SessionMode::Select, HomeworkActions::Selected(options)) => {
                marks.insert("selected_options".to_string(), json!(options));
            }
            (SessionMode::Select, HomeworkActions::Statuses(statuses)) => {
                let options: Vec<&String> = statuses.keys().collect();
                marks.insert("selected_options".to_string(), json!(options));
            }
            (SessionMode::YesNo, HomeworkActions::Selected(_)) => {
                return Err(CommandError::InvalidState(
                    "Yes/No session expects per-type statuses, got a selection list".to_string(),
                ));
            }
        }
        if p.previous_homework_state.is_none() {
            p.previous_homework_state =
                Some(store.live_homework.get(&p.student_id).cloned().unwrap_or_default());
        }
        store.live_homework.insert(p.student_id.clone(), marks);
        Ok(format!(
            "Live Homework updated for {}.",
            store.student_name(&p.student_id)
        ))
    }

    fn undo(&mut self) -> CommandResult {
        let p = &self.payload;
        let mut store = self.store.borrow_mut();
        match &p.previous_homework_state {
            Some(prev) if !prev.is_empty() => {
                store.live_homework.insert(p.student_id.clone(), prev.clone());
            }
            _ => {
                store.live_homework.remove(&p.student_id);
            }
        }
        Ok(format!(
            "Undo Live Homework update for {}.",
            store.student_name(&p.student_id)
        ))
    }

    fn describe(&self) -> String {
        let summary = match &self.payload.homework_actions {
            HomeworkActions::Statuses(statuses) => statuses
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => format!("{k}:{s}"),
                    other => format!("{k}:{other}"),
                })
                .collect::<Vec<_>>()
                .join(", "),
            HomeworkActions::Selected(options) => options.join(", "),
        };
        let store = self.store.borrow();
        let who = store
            .entity(EntityKind::Student, &self.payload.student_id)
            .map_or("Unknown", |s| s.short_name());
        format!(
            "Mark HW ({}): {summary} for {who}",
            self.payload.session_mode.as_str()
        )
    }

    fn payload(&self) -> Result<Value, CommandError> {
        to_payload(&self.payload)
    }
}

impl Restorable for MarkLiveHomeworkCmd {
    type Payload = MarkLiveHomeworkPayload;

    fn from_parts(
        store: SharedStore,
        payload: MarkLiveHomeworkPayload,
        metadata: CommandMetadata,
    ) -> Self {
        Self {
            store,
            metadata,
            payload,
        }
    }
}
