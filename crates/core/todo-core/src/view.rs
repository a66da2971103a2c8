//! Derived, read-only views over a task snapshot.
//!
//! Every function here is pure: callers hand in the current task list and filter
//! selections and get back borrowed subsets, labeled groups and aggregate counts. Input
//! order is preserved unless a grouping mode defines its own in-group ordering.

use crate::model::{Category, CategoryId, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Write;

/// Active/completed tab selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Active,
    Completed,
}

impl Tab {
    /// Whether `task` belongs on this tab. Every task belongs to exactly one tab.
    pub fn contains(&self, task: &Task) -> bool {
        match self {
            Tab::Active => !task.is_completed(),
            Tab::Completed => task.is_completed(),
        }
    }
}

/// How the visible task list is bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    #[default]
    Category,
    Date,
    None,
}

/// Current filter and grouping choices of the task screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub tab: Tab,
    pub category: Option<CategoryId>,
    pub date: Option<NaiveDate>,
    pub group_mode: GroupMode,
}

/// Labels used for sentinel groups and date-mode group names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupLabels {
    /// Label of the group holding tasks without a category
    pub no_category: String,

    /// Label of the group holding tasks without a due date
    pub no_date: String,

    /// `chrono` format string for date-mode labels
    pub date_format: String,
}

impl Default for GroupLabels {
    fn default() -> Self {
        Self {
            no_category: "No category".to_string(),
            no_date: "No date".to_string(),
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

/// A labeled bucket of tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGroup<'a> {
    pub label: String,
    pub tasks: Vec<&'a Task>,
}

/// Number of tasks carrying a given group label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
}

/// Aggregate completion statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    /// Unrounded `0.0..=100.0`; rounding is left to the renderer
    pub percentage: f64,
}

/// Everything a task screen renders, derived in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView<'a> {
    pub groups: Vec<TaskGroup<'a>>,
    pub active_count: usize,
    pub completed_count: usize,
    pub navigation: Vec<GroupCount>,
    pub stats: TaskStats,
}

impl TaskView<'_> {
    pub fn visible_count(&self) -> usize {
        self.groups.iter().map(|g| g.tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_count() == 0
    }
}

/// Split tasks into `(active, completed)`, keeping relative order in each half.
pub fn partition_by_status<'a, I>(tasks: I) -> (Vec<&'a Task>, Vec<&'a Task>)
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().partition(|task| Tab::Active.contains(task))
}

pub fn filter_by_tab<'a, I>(tasks: I, tab: Tab) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().filter(|task| tab.contains(task)).collect()
}

/// Keep tasks in `category`; `None` passes everything through.
pub fn filter_by_category<'a, I>(tasks: I, category: Option<CategoryId>) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    match category {
        Some(id) => tasks
            .into_iter()
            .filter(|task| task.category_id == Some(id))
            .collect(),
        None => tasks.into_iter().collect(),
    }
}

/// Keep tasks due exactly on `date`. Undated tasks never match an active filter.
pub fn filter_by_date<'a, I>(tasks: I, date: Option<NaiveDate>) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    match date {
        Some(date) => tasks
            .into_iter()
            .filter(|task| task.due_date == Some(date))
            .collect(),
        None => tasks.into_iter().collect(),
    }
}

/// Fallback used when a configured date format cannot be rendered.
pub const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format `date` with a `chrono` format string, falling back to ISO dates if the format
/// is invalid.
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_ok() {
        return out;
    }
    date.format(FALLBACK_DATE_FORMAT).to_string()
}

/// Identity of a group; label text is derived from it only for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey {
    Category(CategoryId),
    NoCategory,
    Date(NaiveDate),
    NoDate,
    All,
}

/// Resolves category display names for grouping and sorting.
struct Labeler<'c> {
    names: HashMap<CategoryId, &'c str>,
    labels: &'c GroupLabels,
}

impl<'c> Labeler<'c> {
    fn new(categories: &'c [Category], labels: &'c GroupLabels) -> Self {
        let names = categories
            .iter()
            .map(|category| (category.id, category.name.as_str()))
            .collect();
        Self { names, labels }
    }

    /// Known name of the task's category, else the name joined in by the service.
    fn category_name<'t>(&self, task: &'t Task) -> Option<&'t str>
    where
        'c: 't,
    {
        let id = task.category_id?;
        self.names
            .get(&id)
            .copied()
            .or(task.category_name.as_deref().filter(|name| !name.is_empty()))
    }

    fn category(&self, task: &Task) -> String {
        self.category_name(task)
            .unwrap_or(self.labels.no_category.as_str())
            .to_string()
    }

    fn key(&self, task: &Task, mode: GroupMode) -> GroupKey {
        match mode {
            GroupMode::Category => match (task.category_id, self.category_name(task)) {
                (Some(id), Some(_)) => GroupKey::Category(id),
                _ => GroupKey::NoCategory,
            },
            GroupMode::Date => task.due_date.map_or(GroupKey::NoDate, GroupKey::Date),
            GroupMode::None => GroupKey::All,
        }
    }

    fn label(&self, key: GroupKey, task: &Task) -> String {
        match key {
            GroupKey::Category(_) => self.category(task),
            GroupKey::NoCategory => self.labels.no_category.clone(),
            GroupKey::Date(date) => format_date(date, &self.labels.date_format),
            GroupKey::NoDate => self.labels.no_date.clone(),
            GroupKey::All => String::new(),
        }
    }
}

/// Due dates ascending, undated last.
fn compare_due(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn bucket<'a, I>(tasks: I, mode: GroupMode, labeler: &Labeler<'_>) -> Vec<TaskGroup<'a>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut groups: Vec<TaskGroup<'a>> = Vec::new();
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();

    for task in tasks {
        let key = labeler.key(task, mode);
        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                slots.insert(key, groups.len());
                groups.push(TaskGroup {
                    label: labeler.label(key, task),
                    tasks: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[slot].tasks.push(task);
    }

    groups
}

/// Bucket tasks by `mode`.
///
/// Groups come out in first-encounter order. Category groups are sorted by due date
/// (undated last); date groups are sorted by category display name, with the sentinel
/// label compared as an ordinary string. `GroupMode::None` yields one unlabeled group in
/// input order. All in-group sorts are stable.
pub fn group_by<'a, I>(
    tasks: I,
    mode: GroupMode,
    categories: &[Category],
    labels: &GroupLabels,
) -> Vec<TaskGroup<'a>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let labeler = Labeler::new(categories, labels);

    if mode == GroupMode::None {
        return vec![TaskGroup {
            label: String::new(),
            tasks: tasks.into_iter().collect(),
        }];
    }

    let mut groups = bucket(tasks, mode, &labeler);
    for group in &mut groups {
        match mode {
            GroupMode::Category => group.tasks.sort_by(|a, b| compare_due(a, b)),
            GroupMode::Date => group.tasks.sort_by_cached_key(|task| labeler.category(task)),
            GroupMode::None => {}
        }
    }
    groups
}

/// Completion statistics over the full, unfiltered list.
pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.is_completed()).count();
    let percentage = if total == 0 {
        0.0
    } else {
        100.0 * completed as f64 / total as f64
    };

    TaskStats {
        total,
        completed,
        percentage,
    }
}

/// Per-label counts over the tab-filtered list, independent of category/date filters.
pub fn count_by_group_label(
    tasks: &[Task],
    tab: Tab,
    mode: GroupMode,
    categories: &[Category],
    labels: &GroupLabels,
) -> Vec<GroupCount> {
    group_by(filter_by_tab(tasks, tab), mode, categories, labels)
        .into_iter()
        .map(|group| GroupCount {
            label: group.label,
            count: group.tasks.len(),
        })
        .collect()
}

/// Run the whole tab → category → date → group pipeline for a task screen.
///
/// Navigation counts follow the selected grouping mode and fall back to categories when
/// grouping is off, so a sidebar always has something to list.
pub fn derive_view<'a>(
    tasks: &'a [Task],
    categories: &[Category],
    selection: &Selection,
    labels: &GroupLabels,
) -> TaskView<'a> {
    let (active, completed) = partition_by_status(tasks);
    let (active_count, completed_count) = (active.len(), completed.len());

    let on_tab = match selection.tab {
        Tab::Active => active,
        Tab::Completed => completed,
    };
    let visible = filter_by_date(
        filter_by_category(on_tab, selection.category),
        selection.date,
    );
    let groups = group_by(visible, selection.group_mode, categories, labels);

    let navigation_mode = match selection.group_mode {
        GroupMode::None => GroupMode::Category,
        mode => mode,
    };
    let navigation = count_by_group_label(tasks, selection.tab, navigation_mode, categories, labels);

    TaskView {
        groups,
        active_count,
        completed_count,
        navigation,
        stats: compute_stats(tasks),
    }
}
