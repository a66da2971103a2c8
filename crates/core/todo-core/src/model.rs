//! Task, subtask and category records as served by the todo API.
//!
//! Field names on the wire follow the service (`titulo`, `descricao`, `categoria_id`, ...);
//! the Rust side uses English names. Decoding is lenient because service revisions disagree
//! on how dates and completion flags are encoded.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::warn;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(
    /// Server-assigned task identifier
    TaskId
);
record_id!(
    /// Server-assigned category identifier
    CategoryId
);
record_id!(
    /// Server-assigned subtask identifier
    SubtaskId
);
record_id!(
    /// Server-assigned user identifier
    UserId
);

/// Color the service assigns to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#F97316";

/// Completion state of a task.
///
/// The service stores free text. Only `"concluida"` means completed, anything else is
/// pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub const PENDING_WIRE: &'static str = "pendente";
    pub const COMPLETED_WIRE: &'static str = "concluida";

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => Self::PENDING_WIRE,
            TaskStatus::Completed => Self::COMPLETED_WIRE,
        }
    }

    pub fn from_wire(value: &str) -> Self {
        if value.trim() == Self::COMPLETED_WIRE {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Self::from_wire(&s)).unwrap_or_default())
    }
}

/// A to-do item owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    #[serde(rename = "titulo", default)]
    pub title: String,

    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(rename = "categoria_id", default)]
    pub category_id: Option<CategoryId>,

    /// Category name joined in by the service, when it does so
    #[serde(rename = "categoria_nome", default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    #[serde(rename = "categoria_cor", default, skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,

    #[serde(rename = "data_vencimento", default, with = "lenient_date")]
    pub due_date: Option<NaiveDate>,

    #[serde(rename = "data_criacao", default, with = "lenient_timestamp")]
    pub created_at: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "lenient_subtasks")]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Minimal pending task, mostly useful for building fixtures.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            category_id: None,
            category_name: None,
            category_color: None,
            due_date: None,
            created_at: None,
            subtasks: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Number of completed subtasks, for "2/5"-style progress displays.
    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }

    pub fn subtask(&self, id: SubtaskId) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == id)
    }
}

/// A checklist item belonging to exactly one task.
///
/// Completion is canonically a boolean. Older service revisions send `concluida` as a
/// SQLite 0/1 integer, and some send a task-style `status` string instead; both are
/// folded into `completed` on input. Output always writes `concluida` as a boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSubtask")]
pub struct Subtask {
    pub id: SubtaskId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "concluida")]
    pub completed: bool,

    #[serde(rename = "ordem")]
    pub position: i64,
}

#[derive(Deserialize)]
struct RawSubtask {
    id: SubtaskId,
    #[serde(default)]
    task_id: Option<TaskId>,
    #[serde(default)]
    titulo: String,
    #[serde(default)]
    concluida: Option<CompletionFlag>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    ordem: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompletionFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl CompletionFlag {
    fn is_set(&self) -> bool {
        match self {
            CompletionFlag::Bool(b) => *b,
            CompletionFlag::Int(n) => *n != 0,
            CompletionFlag::Text(s) => {
                matches!(s.trim(), "true" | "1" | TaskStatus::COMPLETED_WIRE)
            }
        }
    }
}

impl From<RawSubtask> for Subtask {
    fn from(raw: RawSubtask) -> Self {
        let completed = match (&raw.concluida, &raw.status) {
            (Some(flag), _) => flag.is_set(),
            (None, Some(status)) => TaskStatus::from_wire(status).is_completed(),
            (None, None) => false,
        };

        Self {
            id: raw.id,
            task_id: raw.task_id,
            title: raw.titulo,
            completed,
            position: raw.ordem.unwrap_or(0),
        }
    }
}

/// A named, colored tag assignable to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "cor", default = "default_color")]
    pub color: String,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: default_color(),
        }
    }
}

fn default_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

/// Identity of the logged-in user as reported by `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
}

/// Decode a task list, skipping entries that lack an identifier or fail to decode.
///
/// A half-populated row never aborts the whole snapshot.
pub fn decode_tasks(values: Vec<serde_json::Value>) -> Vec<Task> {
    decode_lenient(values, "task")
}

/// Decode a category list with the same skipping rules as [`decode_tasks`].
pub fn decode_categories(values: Vec<serde_json::Value>) -> Vec<Category> {
    decode_lenient(values, "category")
}

fn decode_lenient<T: DeserializeOwned>(values: Vec<serde_json::Value>, kind: &str) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(kind, index, error = %e, "Skipping malformed entry");
                None
            }
        })
        .collect()
}

fn lenient_subtasks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Subtask>, D::Error> {
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .map(|values| decode_lenient(values, "subtask"))
        .unwrap_or_default())
}

/// Parse a calendar date from `YYYY-MM-DD` or the date part of a datetime string.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parse a creation timestamp in SQLite, ISO 8601 or RFC 3339 form.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

mod lenient_date {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_due_date))
    }
}

mod lenient_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}
