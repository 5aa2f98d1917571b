#![forbid(unsafe_code)]

//! Ordered log records (behavior, quiz and homework entries).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which ordered log a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogBook {
    /// Behavior and quiz records.
    Behavior,
    /// Homework records.
    Homework,
}

/// The record type tag carried by each log entry.
///
/// Serialized as a bare string. Tags written by other hosts that are not
/// known here are kept verbatim in [`LogKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogKind {
    #[default]
    Behavior,
    Quiz,
    Homework,
    /// Entry produced by a live homework session in yes/no mode.
    HomeworkSessionYesNo,
    /// Entry produced by a live homework session in select mode.
    HomeworkSessionSelect,
    Other(String),
}

impl LogKind {
    /// Wire tag, as written under the `"type"` key.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Behavior => "behavior",
            Self::Quiz => "quiz",
            Self::Homework => "homework",
            Self::HomeworkSessionYesNo => "homework_session_y",
            Self::HomeworkSessionSelect => "homework_session_s",
            Self::Other(tag) => tag,
        }
    }

    /// Capitalized label for status lines ("Quiz").
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Behavior => "Behavior",
            Self::Quiz => "Quiz",
            Self::Homework => "Homework",
            Self::HomeworkSessionYesNo | Self::HomeworkSessionSelect => "Homework session",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for LogKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "behavior" => Self::Behavior,
            "quiz" => Self::Quiz,
            "homework" => Self::Homework,
            "homework_session_y" => Self::HomeworkSessionYesNo,
            "homework_session_s" => Self::HomeworkSessionSelect,
            _ => Self::Other(tag),
        }
    }
}

impl From<LogKind> for String {
    fn from(kind: LogKind) -> Self {
        match kind {
            LogKind::Other(tag) => tag,
            known => known.tag().to_string(),
        }
    }
}

/// One timestamped log entry owned by a student.
///
/// `timestamp` is an ISO-8601 string supplied by the host; logs are kept
/// sorted by it, and lexical order equals chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub student_id: String,
    #[serde(rename = "type", default)]
    pub kind: LogKind,
    /// Behavior name, quiz name or session name.
    #[serde(rename = "behavior", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Homework type name. Some hosts write it next to `behavior`, some
    /// instead of it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homework_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_first_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LogRecord {
    #[must_use]
    pub fn new(
        timestamp: impl Into<String>,
        student_id: impl Into<String>,
        kind: LogKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            student_id: student_id.into(),
            kind,
            name: name.into(),
            homework_type: None,
            student_first_name: None,
            extra: BTreeMap::new(),
        }
    }

    /// Name shown in status lines: `behavior`, else `homework_type`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.homework_type.as_deref() {
            Some(homework_type) if self.name.is_empty() => homework_type,
            _ => &self.name,
        }
    }

    /// Field-level match used when exact identity removal fails.
    ///
    /// Two distinct records sharing timestamp, owner and display name are
    /// indistinguishable here.
    #[must_use]
    pub fn same_key_fields(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.student_id == other.student_id
            && self.display_name() == other.display_name()
    }
}

/// How a record was found when removing it from a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRemoval {
    /// An exactly equal record was removed.
    Identity,
    /// No exact match; the first record matching (timestamp, owner, name)
    /// was removed instead.
    FieldMatch,
}
