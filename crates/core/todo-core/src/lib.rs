//! Core types for the todo client stack.
//!
//! This crate has no I/O. It provides:
//!
//! - The task, subtask and category model with lenient decoding of service payloads
//! - Request payloads for the REST API
//! - The task view-model: tab/category/date filtering, grouping and statistics
//! - The login/register/tasks screen state machine
//! - Input validation shared by every front-end

pub mod draft;
pub mod model;
pub mod screen;
pub mod validation;
pub mod view;

pub use draft::{CategoryDraft, Credentials, SubtaskDraft, TaskDraft, TaskQuery};
pub use model::{
    Category, CategoryId, Subtask, SubtaskId, Task, TaskId, TaskStatus, UserId, UserInfo,
    decode_categories, decode_tasks,
};
pub use screen::{Screen, ScreenAction, ScreenError};
pub use validation::{ValidationError, ValidationResult};
pub use view::{
    GroupCount, GroupLabels, GroupMode, Selection, Tab, TaskGroup, TaskStats, TaskView,
    FALLBACK_DATE_FORMAT, compute_stats, count_by_group_label, derive_view, filter_by_category,
    filter_by_date, filter_by_tab, format_date, group_by, partition_by_status,
};
