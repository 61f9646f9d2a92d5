/// Board projection
///
/// Holds the flat task list of one project and derives the three Kanban
/// columns from it. The list order is the board's manual ordering: a
/// column is the subsequence of tasks with that status, so reordering
/// within a column never disturbs the others.
///
/// # Cross-column moves
///
/// A move is a two-phase local transaction:
///
/// ```text
/// stage_move()   splice the task into the target column, record MoveInverse
///   └─> PATCH /tasks/:id {status}
///         ├─> Ok:  replace the local copy with the server's task
///         └─> Err: rollback(inverse), return the error
/// ```
///
/// Only the status is persisted. Positions are client-side state and are
/// lost on reload.
///
/// # Bulk operations
///
/// Bulk calls are sequential per-item requests. Each returns a
/// [`BulkReport`] naming the ids that succeeded and the ids that failed
/// with the server's message; failed items keep their previous local state.

use crate::api::{ClientError, TaskApi};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use taskflow_shared::models::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use thiserror::Error;
use uuid::Uuid;

/// Board error
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("No project selected")]
    NoProject,

    #[error("Task not on this board: {0}")]
    TaskNotFound(Uuid),

    #[error(transparent)]
    Api(#[from] ClientError),
}

pub type BoardResult<T> = Result<T, BoardError>;

/// Column sort key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Most recently updated first
    #[default]
    Updated,
    /// Newest first
    Created,
    /// Earliest due first, undated last
    Due,
    /// High, then medium, then low
    Priority,
}

impl SortBy {
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortBy::Updated => b.updated_at.cmp(&a.updated_at),
            SortBy::Created => b.created_at.cmp(&a.created_at),
            SortBy::Due => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortBy::Priority => a.priority.rank().cmp(&b.priority.rank()),
        }
    }
}

/// Case-insensitive task filter; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    /// Substring of title, description or any tag
    pub query: String,
    pub priority: Option<TaskPriority>,
    /// Substring of any tag
    pub tag: String,
    /// Substring of the assignee's display name
    pub assignee: String,
}

impl BoardFilter {
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.priority.is_none()
            && self.tag.trim().is_empty()
            && self.assignee.trim().is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        let query = self.query.trim().to_lowercase();
        if !query.is_empty() {
            let in_text = contains(&task.title, &query)
                || task
                    .description
                    .as_deref()
                    .is_some_and(|d| contains(d, &query));
            let in_tags = task.tags.iter().any(|t| contains(t, &query));
            if !in_text && !in_tags {
                return false;
            }
        }

        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }

        let tag = self.tag.trim().to_lowercase();
        if !tag.is_empty() && !task.tags.iter().any(|t| contains(t, &tag)) {
            return false;
        }

        let assignee = self.assignee.trim().to_lowercase();
        if !assignee.is_empty()
            && !task
                .assignee
                .display_name()
                .is_some_and(|name| contains(name, &assignee))
        {
            return false;
        }

        true
    }
}

fn contains(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}

/// How close a task is to its due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    None,
    /// Due within the next 24 hours
    Soon,
    Overdue,
}

pub fn due_state(task: &Task, now: DateTime<Utc>) -> DueState {
    match task.due_date {
        Some(due) if due < now => DueState::Overdue,
        Some(due) if due - now < Duration::hours(24) => DueState::Soon,
        _ => DueState::None,
    }
}

/// Per-column task counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl ColumnCounts {
    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }

    /// Share of done tasks, rounded to a whole percent; 0 for an empty board
    pub fn progress(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        ((self.done as f64 / total as f64) * 100.0).round() as u8
    }
}

/// Derived columns, borrowing from the board
#[derive(Debug, Default)]
pub struct Columns<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl<'a> Columns<'a> {
    pub fn get(&self, status: TaskStatus) -> &[&'a Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    fn get_mut(&mut self, status: TaskStatus) -> &mut Vec<&'a Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Done => &mut self.done,
        }
    }
}

/// Everything needed to undo a staged move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveInverse {
    pub task_id: Uuid,
    /// Index in the flat task list before the move
    pub from_index: usize,
    pub from_status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    pub id: Uuid,
    pub message: String,
}

/// Outcome of a bulk operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<BulkFailure>,
}

impl BulkReport {
    /// True when every item succeeded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<Uuid> {
        self.failed.iter().map(|f| f.id).collect()
    }

    fn record<T>(&mut self, id: Uuid, result: BoardResult<T>) {
        match result {
            Ok(_) => self.succeeded.push(id),
            Err(e) => self.failed.push(BulkFailure {
                id,
                message: e.to_string(),
            }),
        }
    }
}

/// Task board for the selected project
pub struct Board {
    api: Arc<dyn TaskApi>,
    project_id: Option<Uuid>,
    tasks: Vec<Task>,
}

impl Board {
    /// Empty board with no project selected
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        Self {
            api,
            project_id: None,
            tasks: Vec::new(),
        }
    }

    pub fn project_id(&self) -> Option<Uuid> {
        self.project_id
    }

    /// Tasks in board order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Switches to `project_id` and fetches its tasks
    ///
    /// `None` clears the board. Tasks of the previous project are dropped
    /// before the fetch, so a failed load leaves an empty board.
    pub async fn load(&mut self, project_id: Option<Uuid>) -> BoardResult<()> {
        if self.project_id != project_id {
            self.tasks.clear();
        }
        self.project_id = project_id;
        self.reload().await
    }

    /// Refetches the current project's tasks, discarding local ordering
    pub async fn reload(&mut self) -> BoardResult<()> {
        let Some(project_id) = self.project_id else {
            self.tasks.clear();
            return Ok(());
        };

        self.tasks = self.api.list_tasks(project_id).await?;
        tracing::debug!(project_id = %project_id, count = self.tasks.len(), "Board loaded");
        Ok(())
    }

    // ---------------------------------------------------------------- views

    /// Tasks of one column in board order
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Filtered columns, sorted by `sort` when given, else in board order
    ///
    /// Sorting is stable, so board order breaks ties.
    pub fn columns(&self, filter: &BoardFilter, sort: Option<SortBy>) -> Columns<'_> {
        let mut columns = Columns::default();
        for task in self.tasks.iter().filter(|t| filter.matches(t)) {
            columns.get_mut(task.status).push(task);
        }

        if let Some(sort) = sort {
            for status in TaskStatus::ALL {
                columns.get_mut(status).sort_by(|a, b| sort.compare(a, b));
            }
        }
        columns
    }

    pub fn counts(&self) -> ColumnCounts {
        let mut counts = ColumnCounts::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    pub fn progress(&self) -> u8 {
        self.counts().progress()
    }

    // ------------------------------------------------------------ mutations

    /// Creates a task in the current project and puts it at the top
    pub async fn create_task(&mut self, fields: NewTask) -> BoardResult<Task> {
        let project_id = self.project_id.ok_or(BoardError::NoProject)?;
        let task = self.api.create_task(project_id, &fields).await?;

        tracing::info!(project_id = %project_id, task_id = %task.id, "Task created");
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Sends `patch` and replaces the local copy in place
    pub async fn update_task(&mut self, id: Uuid, patch: TaskPatch) -> BoardResult<Task> {
        if self.position(id).is_none() {
            return Err(BoardError::TaskNotFound(id));
        }

        let task = self.api.update_task(id, &patch).await?;
        self.replace(task.clone());
        Ok(task)
    }

    pub async fn remove_task(&mut self, id: Uuid) -> BoardResult<()> {
        self.api.delete_task(id).await?;
        self.tasks.retain(|t| t.id != id);

        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }

    /// Moves a task to column `to` at `index` and persists the new status
    ///
    /// `index` is clamped to the target column's length. On failure the
    /// board is restored to its exact previous order and the error is
    /// returned.
    pub async fn move_task(&mut self, id: Uuid, to: TaskStatus, index: usize) -> BoardResult<Task> {
        let inverse = self.stage_move(id, to, index)?;

        match self.api.update_task(id, &TaskPatch::status(to)).await {
            Ok(task) => {
                tracing::info!(task_id = %id, status = to.as_str(), "Task moved");
                self.replace(task.clone());
                Ok(task)
            }
            Err(e) => {
                tracing::warn!(task_id = %id, error = %e, "Move rejected; restoring previous position");
                self.rollback(inverse);
                Err(e.into())
            }
        }
    }

    /// Local half of a move; returns the inverse that undoes it
    pub fn stage_move(&mut self, id: Uuid, to: TaskStatus, index: usize) -> BoardResult<MoveInverse> {
        let from_index = self.position(id).ok_or(BoardError::TaskNotFound(id))?;
        let mut task = self.tasks.remove(from_index);
        let inverse = MoveInverse {
            task_id: id,
            from_index,
            from_status: task.status,
        };

        task.status = to;
        let at = self.insertion_point(to, index, self.tasks.len());
        self.tasks.insert(at, task);
        Ok(inverse)
    }

    /// Restores the status and list position recorded by [`Board::stage_move`]
    pub fn rollback(&mut self, inverse: MoveInverse) {
        let Some(position) = self.position(inverse.task_id) else {
            return;
        };

        let mut task = self.tasks.remove(position);
        task.status = inverse.from_status;
        let at = inverse.from_index.min(self.tasks.len());
        self.tasks.insert(at, task);
    }

    /// Client-only reorder inside one column
    ///
    /// An out-of-range `from` is ignored; `to` is clamped to the column.
    pub fn reorder_within(&mut self, status: TaskStatus, from: usize, to: usize) {
        let Some(&source) = self.positions(status).get(from) else {
            return;
        };

        let task = self.tasks.remove(source);
        let at = self.insertion_point(status, to, source);
        self.tasks.insert(at, task);
    }

    // ----------------------------------------------------------------- bulk

    pub async fn bulk_delete(&mut self, ids: &[Uuid]) -> BulkReport {
        let mut report = BulkReport::default();
        for &id in ids {
            let result = self.remove_task(id).await;
            report.record(id, result);
        }
        log_report("delete", &report);
        report
    }

    /// Moves each task to the top of `to`, in the order given
    pub async fn bulk_move(&mut self, ids: &[Uuid], to: TaskStatus) -> BulkReport {
        let mut report = BulkReport::default();
        for &id in ids {
            let result = self.move_task(id, to, 0).await;
            report.record(id, result);
        }
        log_report("move", &report);
        report
    }

    pub async fn bulk_set_priority(&mut self, ids: &[Uuid], priority: TaskPriority) -> BulkReport {
        let mut report = BulkReport::default();
        for &id in ids {
            let result = self.update_task(id, TaskPatch::priority(priority)).await;
            report.record(id, result);
        }
        log_report("set_priority", &report);
        report
    }

    // -------------------------------------------------------------- helpers

    fn position(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// List indices of the tasks in `status`, in board order
    fn positions(&self, status: TaskStatus) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == status)
            .map(|(i, _)| i)
            .collect()
    }

    /// List index that makes an inserted task the `index`-th of `status`
    ///
    /// Past the end of the column the task goes right after its last
    /// member; an empty column falls back to `empty_at`.
    fn insertion_point(&self, status: TaskStatus, index: usize, empty_at: usize) -> usize {
        let positions = self.positions(status);
        match positions.get(index) {
            Some(&at) => at,
            None => positions.last().map_or(empty_at, |&last| last + 1),
        }
    }

    fn replace(&mut self, task: Task) {
        if let Some(position) = self.position(task.id) {
            self.tasks[position] = task;
        }
    }
}

fn log_report(operation: &str, report: &BulkReport) {
    if report.is_complete() {
        tracing::info!(operation, succeeded = report.succeeded.len(), "Bulk operation finished");
    } else {
        tracing::warn!(
            operation,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Bulk operation partially failed"
        );
    }
}
