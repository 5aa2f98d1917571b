#![forbid(unsafe_code)]

//! Host settings: a sparse JSON-valued map with typed defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Default number of days an undo-history entry is kept.
pub const DEFAULT_MAX_UNDO_HISTORY_DAYS: u32 = 90;

/// The application settings map.
///
/// Settings are replaced wholesale by commands, so the map is kept as plain
/// JSON values; typed accessors cover the keys the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, Value>);

impl Default for Settings {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(
            "max_undo_history_days".to_string(),
            json!(DEFAULT_MAX_UNDO_HISTORY_DAYS),
        );
        map.insert("current_mode".to_string(), json!("behavior"));
        map.insert("show_grid".to_string(), json!(false));
        map.insert("grid_size".to_string(), json!(20));
        map.insert("default_student_box_width".to_string(), json!(130));
        map.insert("default_student_box_height".to_string(), json!(80));
        map.insert("student_groups_enabled".to_string(), json!(true));
        map.insert("password_on_edit_action".to_string(), json!(false));
        map.insert("next_group_id_num".to_string(), json!(1));
        Self(map)
    }
}

impl Settings {
    /// An empty map, with no defaults filled in.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a key, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Fill in every default key that is missing, keeping existing values.
    pub fn fill_defaults(&mut self) {
        for (key, value) in Self::default().0 {
            self.0.entry(key).or_insert(value);
        }
    }

    /// `max_undo_history_days`, if present and a positive integer.
    #[must_use]
    pub fn max_undo_history_days(&self) -> Option<u32> {
        self.0
            .get("max_undo_history_days")
            .and_then(Value::as_u64)
            .and_then(|d| u32::try_from(d).ok())
            .filter(|d| *d > 0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Settings {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_history_window() {
        assert_eq!(
            Settings::default().max_undo_history_days(),
            Some(DEFAULT_MAX_UNDO_HISTORY_DAYS)
        );
    }

    #[test]
    fn non_positive_window_is_ignored() {
        let mut s = Settings::empty();
        s.set("max_undo_history_days", json!(0));
        assert_eq!(s.max_undo_history_days(), None);
        s.set("max_undo_history_days", json!("thirty"));
        assert_eq!(s.max_undo_history_days(), None);
    }

    #[test]
    fn fill_defaults_keeps_existing_values() {
        let mut s = Settings::empty();
        s.set("grid_size", json!(40));
        s.fill_defaults();
        assert_eq!(s.get("grid_size"), Some(&json!(40)));
        assert!(s.get("current_mode").is_some());
    }
}
