//! Client-side checks run before anything is sent to the API.

use crate::draft::{CategoryDraft, Credentials, SubtaskDraft, TaskDraft};
use chrono::NaiveDate;
use thiserror::Error;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

pub type ValidationResult<T = ()> = Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Fill in all fields")]
    MissingCredentials,

    #[error("Task title is required")]
    EmptyTitle,

    #[error("Task title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("Description must be at most {max} characters")]
    DescriptionTooLong { max: usize },

    #[error("Due date {due} is in the past")]
    DueDateInPast { due: NaiveDate },

    #[error("Category name is required")]
    EmptyCategoryName,

    #[error("Subtask title is required")]
    EmptySubtaskTitle,
}

pub fn validate_credentials(credentials: &Credentials) -> ValidationResult {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Checks for a task about to be created. Due dates before `today` are rejected.
pub fn validate_new_task(draft: &TaskDraft, today: NaiveDate) -> ValidationResult {
    validate_task_update(draft)?;

    if let Some(due) = draft.due_date {
        if due < today {
            return Err(ValidationError::DueDateInPast { due });
        }
    }
    Ok(())
}

/// Checks for an edit. Past due dates are allowed here so overdue tasks stay editable.
pub fn validate_task_update(draft: &TaskDraft) -> ValidationResult {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if draft.title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN });
    }
    if let Some(description) = &draft.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong {
                max: MAX_DESCRIPTION_LEN,
            });
        }
    }
    Ok(())
}

pub fn validate_category(draft: &CategoryDraft) -> ValidationResult {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::EmptyCategoryName);
    }
    Ok(())
}

pub fn validate_subtask(draft: &SubtaskDraft) -> ValidationResult {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::EmptySubtaskTitle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_credentials_required() {
        assert_eq!(
            validate_credentials(&Credentials::new("  ", "secret")),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            validate_credentials(&Credentials::new("a@b.c", "")),
            Err(ValidationError::MissingCredentials)
        );
        assert!(validate_credentials(&Credentials::new("a@b.c", "secret")).is_ok());
    }

    #[test]
    fn test_new_task_title_rules() {
        assert_eq!(
            validate_new_task(&TaskDraft::new("   "), today()),
            Err(ValidationError::EmptyTitle)
        );
        assert_eq!(
            validate_new_task(&TaskDraft::new("x".repeat(201)), today()),
            Err(ValidationError::TitleTooLong { max: 200 })
        );
        assert!(validate_new_task(&TaskDraft::new("ç".repeat(200)), today()).is_ok());
    }

    #[test]
    fn test_new_task_rejects_past_due_date() {
        let yesterday = NaiveDate::from_ymd_opt(2024, 3, 9);
        let draft = TaskDraft::new("Pagar conta").with_due_date(yesterday);

        assert_eq!(
            validate_new_task(&draft, today()),
            Err(ValidationError::DueDateInPast {
                due: yesterday.unwrap()
            })
        );
        assert!(validate_task_update(&draft).is_ok());

        let on_the_day = TaskDraft::new("Pagar conta").with_due_date(Some(today()));
        assert!(validate_new_task(&on_the_day, today()).is_ok());
    }

    #[test]
    fn test_description_length() {
        let draft = TaskDraft::new("ok").with_description("d".repeat(1001));
        assert_eq!(
            validate_task_update(&draft),
            Err(ValidationError::DescriptionTooLong { max: 1000 })
        );
    }

    #[test]
    fn test_category_and_subtask_names() {
        assert_eq!(
            validate_category(&CategoryDraft::new("", None)),
            Err(ValidationError::EmptyCategoryName)
        );
        assert_eq!(
            validate_subtask(&SubtaskDraft::new(" ")),
            Err(ValidationError::EmptySubtaskTitle)
        );
    }
}
