#![forbid(unsafe_code)]

//! Seating-chart entities: students, furniture, layout guides and groups.
//!
//! Entities are typed where the history engine needs to reason about a field
//! (position, size, group, style overrides) and keep every other attribute in
//! a sparse JSON map, so records written by older versions of the host load
//! without losing fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which entity collection an id lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Student,
    Furniture,
}

impl EntityKind {
    /// Wire name, also used as the id prefix (`student_12`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Furniture => "furniture",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student box or a piece of furniture on the seating chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: String,
    /// Full name for students, label for furniture.
    #[serde(default, alias = "full_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Sparse per-entity style overrides. An absent key means "use the
    /// global setting".
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style_overrides: BTreeMap<String, Value>,
    /// Every other attribute the host stores on the entity.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Entity {
    /// Create an entity with a name at a position, using zero size.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            first_name: None,
            x,
            y,
            width: 0.0,
            height: 0.0,
            group_id: None,
            style_overrides: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Short name used in status lines: the first name when known.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or(&self.name)
    }

    /// Overlay a field delta onto this entity, the way a JSON object update
    /// would. Known fields are re-typed; unknown keys land in `attributes`.
    ///
    /// On error the entity is left unchanged.
    pub fn apply_changes(&mut self, changes: &BTreeMap<String, Value>) -> serde_json::Result<()> {
        let mut fields: Map<String, Value> = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in changes {
            // `full_name` is the legacy spelling of `name`; both present would be a duplicate.
            let key = if key == "full_name" { "name" } else { key.as_str() };
            fields.insert(key.to_string(), value.clone());
        }
        *self = serde_json::from_value(Value::Object(fields))?;
        Ok(())
    }
}

/// Orientation of a layout guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideOrientation {
    #[serde(rename = "h", alias = "horizontal")]
    Horizontal,
    #[serde(rename = "v", alias = "vertical")]
    Vertical,
}

impl GuideOrientation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// A horizontal or vertical alignment guide in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub orientation: GuideOrientation,
    pub world_coord: f64,
}

/// A named student group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            extra: BTreeMap::new(),
        }
    }
}
