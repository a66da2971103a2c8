//! The authoritative task list of a logged-in session.
//!
//! Every successful mutation is followed by a full reload; the board never patches its list
//! locally. Reloads are ticketed so a slow response can never overwrite a newer one.

use crate::api::{Ack, ApiClient};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use todo_core::validation::{
    validate_category, validate_new_task, validate_subtask, validate_task_update,
};
use todo_core::{
    Category, CategoryDraft, CategoryId, GroupLabels, GroupMode, Selection, SubtaskDraft,
    SubtaskId, Tab, Task, TaskDraft, TaskId, TaskQuery, TaskView, ValidationResult, derive_view,
};

/// The remote operations a [`TaskBoard`] needs.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    async fn list_tasks(&self, query: &TaskQuery) -> ClientResult<Vec<Task>>;
    async fn list_categories(&self) -> ClientResult<Vec<Category>>;

    async fn create_task(&self, draft: &TaskDraft) -> ClientResult<Ack>;
    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> ClientResult<Ack>;
    async fn delete_task(&self, id: TaskId) -> ClientResult<Ack>;

    async fn create_category(&self, draft: &CategoryDraft) -> ClientResult<Ack>;
    async fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> ClientResult<Ack>;
    async fn delete_category(&self, id: CategoryId) -> ClientResult<Ack>;

    async fn create_subtask(&self, task_id: TaskId, draft: &SubtaskDraft) -> ClientResult<Ack>;
    async fn update_subtask(&self, id: SubtaskId, draft: &SubtaskDraft) -> ClientResult<Ack>;
    async fn delete_subtask(&self, id: SubtaskId) -> ClientResult<Ack>;
}

#[async_trait]
impl TaskBackend for ApiClient {
    async fn list_tasks(&self, query: &TaskQuery) -> ClientResult<Vec<Task>> {
        ApiClient::list_tasks(self, query).await
    }

    async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        ApiClient::list_categories(self).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> ClientResult<Ack> {
        ApiClient::create_task(self, draft).await
    }

    async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> ClientResult<Ack> {
        ApiClient::update_task(self, id, draft).await
    }

    async fn delete_task(&self, id: TaskId) -> ClientResult<Ack> {
        ApiClient::delete_task(self, id).await
    }

    async fn create_category(&self, draft: &CategoryDraft) -> ClientResult<Ack> {
        ApiClient::create_category(self, draft).await
    }

    async fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> ClientResult<Ack> {
        ApiClient::update_category(self, id, draft).await
    }

    async fn delete_category(&self, id: CategoryId) -> ClientResult<Ack> {
        ApiClient::delete_category(self, id).await
    }

    async fn create_subtask(&self, task_id: TaskId, draft: &SubtaskDraft) -> ClientResult<Ack> {
        ApiClient::create_subtask(self, task_id, draft).await
    }

    async fn update_subtask(&self, id: SubtaskId, draft: &SubtaskDraft) -> ClientResult<Ack> {
        ApiClient::update_subtask(self, id, draft).await
    }

    async fn delete_subtask(&self, id: SubtaskId) -> ClientResult<Ack> {
        ApiClient::delete_subtask(self, id).await
    }
}

/// Snapshot of everything a task screen shows.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub selection: Selection,
    /// Inline error of the last failed action
    pub message: Option<String>,
    applied_ticket: u64,
}

impl BoardState {
    pub fn view(&self, labels: &GroupLabels) -> TaskView<'_> {
        derive_view(&self.tasks, &self.categories, &self.selection, labels)
    }

    /// Whether at least one reload has been applied.
    pub fn is_loaded(&self) -> bool {
        self.applied_ticket > 0
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

pub struct TaskBoard<B> {
    backend: Arc<B>,
    state: Arc<RwLock<BoardState>>,
    next_ticket: AtomicU64,
}

const LOAD_FAILED: &str = "Failed to load tasks";
const CREATE_FAILED: &str = "Failed to create task";
const UPDATE_FAILED: &str = "Failed to update task";
const TOGGLE_FAILED: &str = "Failed to update status";
const DELETE_FAILED: &str = "Failed to delete task";
const CATEGORY_FAILED: &str = "Failed to save category";
const CATEGORY_DELETE_FAILED: &str = "Failed to delete category";
const SUBTASK_FAILED: &str = "Failed to save subtask";
const SUBTASK_DELETE_FAILED: &str = "Failed to delete subtask";

impl<B: TaskBackend> TaskBoard<B> {
    pub fn new(backend: B) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    pub fn with_backend(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(BoardState::default())),
            next_ticket: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn snapshot(&self) -> BoardState {
        self.state.read().await.clone()
    }

    /// Run `f` against the current view without cloning the task list.
    pub async fn with_view<R>(&self, labels: &GroupLabels, f: impl FnOnce(&TaskView<'_>) -> R) -> R {
        let state = self.state.read().await;
        f(&state.view(labels))
    }

    pub async fn message(&self) -> Option<String> {
        self.state.read().await.message.clone()
    }

    pub async fn selection(&self) -> Selection {
        self.state.read().await.selection.clone()
    }

    pub async fn set_tab(&self, tab: Tab) {
        self.state.write().await.selection.tab = tab;
    }

    pub async fn set_category_filter(&self, category: Option<CategoryId>) {
        self.state.write().await.selection.category = category;
    }

    pub async fn set_date_filter(&self, date: Option<NaiveDate>) {
        self.state.write().await.selection.date = date;
    }

    pub async fn set_group_mode(&self, mode: GroupMode) {
        self.state.write().await.selection.group_mode = mode;
    }

    pub async fn set_selection(&self, selection: Selection) {
        self.state.write().await.selection = selection;
    }

    /// User-initiated reload. Clears the inline message first.
    pub async fn reload(&self) -> ClientResult<()> {
        self.begin().await;
        self.refresh().await
    }

    /// Fetch tasks and categories and replace the list wholesale.
    ///
    /// A response is applied only if no later-issued reload has been applied already.
    pub async fn refresh(&self) -> ClientResult<()> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let query = TaskQuery::default();
        let result = tokio::try_join!(
            self.backend.list_tasks(&query),
            self.backend.list_categories(),
        );

        let mut state = self.state.write().await;
        if ticket <= state.applied_ticket {
            debug!(
                ticket,
                applied = state.applied_ticket,
                "Dropping stale task list response"
            );
            return result.map(|_| ());
        }

        match result {
            Ok((tasks, categories)) => {
                debug!(ticket, tasks = tasks.len(), "Applied task list");
                state.tasks = tasks;
                state.categories = categories;
                state.applied_ticket = ticket;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "{LOAD_FAILED}");
                state.message = Some(failure_message(LOAD_FAILED, &e));
                Err(e)
            }
        }
    }

    /// Create a task, rejecting due dates before today's local date.
    pub async fn create_task(&self, draft: TaskDraft) -> ClientResult<Ack> {
        self.create_task_as_of(draft, Local::now().date_naive()).await
    }

    pub async fn create_task_as_of(&self, draft: TaskDraft, today: NaiveDate) -> ClientResult<Ack> {
        self.begin().await;
        self.check(CREATE_FAILED, validate_new_task(&draft, today))
            .await?;

        let ack = self
            .run(CREATE_FAILED, self.backend.create_task(&draft))
            .await?;
        info!(id = ?ack.id, "Created task");
        Ok(ack)
    }

    pub async fn update_task(&self, id: TaskId, draft: TaskDraft) -> ClientResult<Ack> {
        self.begin().await;
        self.check(UPDATE_FAILED, validate_task_update(&draft))
            .await?;
        self.run(UPDATE_FAILED, self.backend.update_task(id, &draft))
            .await
    }

    /// Flip a task between pending and completed, resending all of its fields.
    pub async fn toggle_task(&self, id: TaskId) -> ClientResult<Ack> {
        self.begin().await;

        let draft = {
            let state = self.state.read().await;
            state
                .task(id)
                .map(|task| TaskDraft::from_task(task).with_status(task.status.toggled()))
        };
        let draft = match draft {
            Some(draft) => draft,
            None => return Err(self.fail(TOGGLE_FAILED, not_found_task(id)).await),
        };

        self.run(TOGGLE_FAILED, self.backend.update_task(id, &draft))
            .await
    }

    pub async fn delete_task(&self, id: TaskId) -> ClientResult<Ack> {
        self.begin().await;
        self.run(DELETE_FAILED, self.backend.delete_task(id)).await
    }

    pub async fn create_category(&self, draft: CategoryDraft) -> ClientResult<Ack> {
        self.begin().await;
        self.check(CATEGORY_FAILED, validate_category(&draft)).await?;
        self.run(CATEGORY_FAILED, self.backend.create_category(&draft))
            .await
    }

    pub async fn update_category(&self, id: CategoryId, draft: CategoryDraft) -> ClientResult<Ack> {
        self.begin().await;
        self.check(CATEGORY_FAILED, validate_category(&draft)).await?;
        self.run(CATEGORY_FAILED, self.backend.update_category(id, &draft))
            .await
    }

    pub async fn delete_category(&self, id: CategoryId) -> ClientResult<Ack> {
        self.begin().await;
        self.run(CATEGORY_DELETE_FAILED, self.backend.delete_category(id))
            .await
    }

    pub async fn add_subtask(&self, task_id: TaskId, title: impl Into<String>) -> ClientResult<Ack> {
        self.begin().await;

        let draft = SubtaskDraft::new(title);
        self.check(SUBTASK_FAILED, validate_subtask(&draft)).await?;
        if self.state.read().await.task(task_id).is_none() {
            return Err(self.fail(SUBTASK_FAILED, not_found_task(task_id)).await);
        }

        self.run(SUBTASK_FAILED, self.backend.create_subtask(task_id, &draft))
            .await
    }

    pub async fn toggle_subtask(&self, id: SubtaskId) -> ClientResult<Ack> {
        self.begin().await;

        let draft = match self.find_subtask_draft(id).await {
            Some(mut draft) => {
                draft.completed = !draft.completed;
                draft
            }
            None => return Err(self.fail(SUBTASK_FAILED, not_found_subtask(id)).await),
        };

        self.run(SUBTASK_FAILED, self.backend.update_subtask(id, &draft))
            .await
    }

    pub async fn rename_subtask(&self, id: SubtaskId, title: impl Into<String>) -> ClientResult<Ack> {
        self.begin().await;

        let draft = match self.find_subtask_draft(id).await {
            Some(draft) => SubtaskDraft {
                title: title.into(),
                ..draft
            },
            None => return Err(self.fail(SUBTASK_FAILED, not_found_subtask(id)).await),
        };
        self.check(SUBTASK_FAILED, validate_subtask(&draft)).await?;

        self.run(SUBTASK_FAILED, self.backend.update_subtask(id, &draft))
            .await
    }

    pub async fn delete_subtask(&self, id: SubtaskId) -> ClientResult<Ack> {
        self.begin().await;
        self.run(SUBTASK_DELETE_FAILED, self.backend.delete_subtask(id))
            .await
    }

    async fn find_subtask_draft(&self, id: SubtaskId) -> Option<SubtaskDraft> {
        let state = self.state.read().await;
        state
            .tasks
            .iter()
            .find_map(|task| task.subtask(id))
            .map(SubtaskDraft::from_subtask)
    }

    async fn begin(&self) {
        self.state.write().await.message = None;
    }

    async fn check(&self, failure: &'static str, result: ValidationResult) -> ClientResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(failure, e.into()).await),
        }
    }

    /// Await a backend call, then reload on success or record the message on failure.
    ///
    /// A mutation the service accepted stays successful when the reload after it fails;
    /// the load failure is left as the board message instead.
    async fn run<T>(
        &self,
        failure: &'static str,
        call: impl Future<Output = ClientResult<T>>,
    ) -> ClientResult<T> {
        match call.await {
            Ok(value) => {
                if let Err(e) = self.refresh().await {
                    debug!(error = %e, "Reload after {failure:?} action failed");
                }
                Ok(value)
            }
            Err(e) => Err(self.fail(failure, e).await),
        }
    }

    async fn fail(&self, failure: &'static str, error: ClientError) -> ClientError {
        warn!(error = %error, "{failure}");
        self.state.write().await.message = Some(failure_message(failure, &error));
        error
    }
}

fn failure_message(failure: &str, error: &ClientError) -> String {
    match error {
        ClientError::Validation(_) | ClientError::NotFound(_) => error.user_message(),
        e if e.is_auth_failure() => e.user_message(),
        _ => failure.to_string(),
    }
}

fn not_found_task(id: TaskId) -> ClientError {
    ClientError::NotFound(format!("Task {id}"))
}

fn not_found_subtask(id: SubtaskId) -> ClientError {
    ClientError::NotFound(format!("Subtask {id}"))
}
