//! Request payloads sent to the todo API.

use crate::model::{CategoryId, DEFAULT_CATEGORY_COLOR, Subtask, Task, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Email/password pair used for both login and registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Form fields expected by `POST /login` (OAuth2 password form).
    pub fn as_login_form(&self) -> [(&'static str, &str); 2] {
        [("username", self.email.as_str()), ("password", self.password.as_str())]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /tasks` and `PUT /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: TaskStatus,

    #[serde(rename = "categoria_id")]
    pub category_id: Option<CategoryId>,

    #[serde(rename = "data_vencimento")]
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Full-field draft mirroring an existing task, used for edits and toggles.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            category_id: task.category_id,
            due_date: task.due_date,
        }
    }
}

/// Body of `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "cor")]
    pub color: String,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            name: name.into(),
            color: color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
        }
    }
}

/// Body of `POST /tasks/{id}/subtasks` and `PUT /subtasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskDraft {
    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "concluida")]
    pub completed: bool,
}

impl SubtaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }

    pub fn from_subtask(subtask: &Subtask) -> Self {
        Self {
            title: subtask.title.clone(),
            completed: subtask.completed,
        }
    }
}

/// Server-side filters accepted by `GET /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(rename = "categoria_id", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    #[serde(rename = "data_inicio", skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,

    #[serde(rename = "data_fim", skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl TaskQuery {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.from.is_none() && self.to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("ana@example.com", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ana@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_task_draft_wire_shape() {
        let draft = TaskDraft::new("Comprar pão")
            .with_category(Some(CategoryId(2)))
            .with_due_date(NaiveDate::from_ymd_opt(2024, 3, 10));

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            value,
            json!({
                "titulo": "Comprar pão",
                "status": "pendente",
                "categoria_id": 2,
                "data_vencimento": "2024-03-10"
            })
        );
    }

    #[test]
    fn test_task_draft_from_task_keeps_fields() {
        let mut task = Task::new(1, "Relatório");
        task.description = Some("mensal".to_string());
        task.status = TaskStatus::Completed;
        task.category_id = Some(CategoryId(9));

        let draft = TaskDraft::from_task(&task);
        assert_eq!(draft.title, "Relatório");
        assert_eq!(draft.description.as_deref(), Some("mensal"));
        assert_eq!(draft.status, TaskStatus::Completed);
        assert_eq!(draft.category_id, Some(CategoryId(9)));
    }

    #[test]
    fn test_task_query_omits_unset_filters() {
        let query = TaskQuery::default();
        assert!(query.is_empty());
        assert_eq!(serde_json::to_value(&query).unwrap(), json!({}));

        let query = TaskQuery {
            category_id: Some(CategoryId(4)),
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: None,
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"categoria_id": 4, "data_inicio": "2024-01-01"})
        );
    }
}
