//! Task ordering use-case service.
//!
//! # Responsibility
//! - Run "resolve neighbors, compute key, persist" as one unit per move.
//! - Validate task-level rules above the repository layer.
//!
//! # Invariants
//! - A move or insert writes exactly one task row.
//! - Calendar-derived tasks are never moved and never used as neighbors.
//! - Deleted tasks never act as neighbors.
//! - A move with no eligible neighbor on either side keeps the existing key.

use crate::model::task::{ListId, Task, TaskId};
use crate::ordering::{
    allocate_for_neighbors, reposition, resolve_neighbors, NeighborKeys, OrderKey,
    OrderedItem, SortKeyConfig, SortKeyError,
};
use crate::repo::task_repo::{TaskRepoError, TaskRepository};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from task ordering operations.
#[derive(Debug)]
pub enum TaskOrderError {
    /// Title is blank after trim.
    InvalidTitle,
    /// Target task does not exist or is soft-deleted.
    TaskNotFound(TaskId),
    /// Target task is mirrored from the calendar and cannot be moved.
    SystemDerivedTask(TaskId),
    /// Neighbor resolution or key allocation failed.
    Sort(SortKeyError),
    /// Repository-level failure.
    Repo(TaskRepoError),
}

impl Display for TaskOrderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "task title must not be blank"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::SystemDerivedTask(id) => {
                write!(f, "task is mirrored from the calendar and cannot move: {id}")
            }
            Self::Sort(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskOrderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sort(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SortKeyError> for TaskOrderError {
    fn from(value: SortKeyError) -> Self {
        Self::Sort(value)
    }
}

impl From<TaskRepoError> for TaskOrderError {
    fn from(value: TaskRepoError) -> Self {
        match value {
            TaskRepoError::NotFound(id) => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Task ordering service facade.
///
/// Owns its random source so jitter draws can be reproduced by seeding.
pub struct TaskOrderService<R: TaskRepository, G: Rng = StdRng> {
    repo: R,
    config: SortKeyConfig,
    rng: G,
}

impl<R: TaskRepository> TaskOrderService<R> {
    /// Creates service with an entropy-seeded random source.
    pub fn new(repo: R, config: SortKeyConfig) -> Self {
        Self::with_rng(repo, config, StdRng::from_entropy())
    }
}

impl<R: TaskRepository, G: Rng> TaskOrderService<R, G> {
    /// Creates service with a caller-provided random source.
    pub fn with_rng(repo: R, config: SortKeyConfig, rng: G) -> Self {
        Self { repo, config, rng }
    }

    pub fn config(&self) -> &SortKeyConfig {
        &self.config
    }

    /// Lists active tasks of one list in position order.
    pub fn list_tasks(&self, list_uuid: Option<ListId>) -> Result<Vec<Task>, TaskOrderError> {
        self.repo.list_tasks(list_uuid).map_err(Into::into)
    }

    /// Creates a local task at `index` (appends when `None` or past the end).
    pub fn insert_task(
        &mut self,
        list_uuid: Option<ListId>,
        title: impl Into<String>,
        index: Option<usize>,
    ) -> Result<Task, TaskOrderError> {
        let started_at = Instant::now();
        let result = self.insert_task_inner(list_uuid, title.into(), index);
        log_outcome("task_insert", started_at, &result);
        result
    }

    /// Stores a calendar-mirrored task with its externally supplied key.
    pub fn mirror_calendar_task(
        &self,
        list_uuid: Option<ListId>,
        title: impl Into<String>,
        task_sort: OrderKey,
    ) -> Result<Task, TaskOrderError> {
        let task = Task::calendar(list_uuid, normalize_title(title.into())?, task_sort);
        self.repo.create_task(&task)?;
        info!("event=task_mirror module=order status=ok task={}", task.uuid);
        Ok(task)
    }

    /// Moves the task at `from` to `to` inside one list.
    ///
    /// # Errors
    /// - `Sort(InvalidIndex)` when either index is outside the list.
    /// - `SystemDerivedTask` when the task at `from` is calendar-derived.
    pub fn move_within_list(
        &mut self,
        list_uuid: Option<ListId>,
        from: usize,
        to: usize,
    ) -> Result<Task, TaskOrderError> {
        let started_at = Instant::now();
        let result = self.move_within_list_inner(list_uuid, from, to);
        log_outcome("task_move", started_at, &result);
        result
    }

    /// Moves one task into `target_list` at `target_index` (appends when
    /// `None` or past the end). Works for same-list moves as well.
    pub fn move_to_list(
        &mut self,
        task_uuid: TaskId,
        target_list: Option<ListId>,
        target_index: Option<usize>,
    ) -> Result<Task, TaskOrderError> {
        let started_at = Instant::now();
        let result = self.move_to_list_inner(task_uuid, target_list, target_index);
        log_outcome("task_move", started_at, &result);
        result
    }

    fn insert_task_inner(
        &mut self,
        list_uuid: Option<ListId>,
        title: String,
        index: Option<usize>,
    ) -> Result<Task, TaskOrderError> {
        let title = normalize_title(title)?;
        let mut arranged = self.repo.list_tasks(list_uuid)?;
        let index = clamp_index(index, arranged.len());

        let mut task = Task::new(list_uuid, title, self.config.default_key());
        arranged.insert(index, task.clone());
        let neighbors = resolve_neighbors(&arranged, index, Task::is_active)?;
        task.task_sort = allocate_for_neighbors(neighbors, &self.config, &mut self.rng)?;

        self.repo.create_task(&task)?;
        Ok(task)
    }

    fn move_within_list_inner(
        &mut self,
        list_uuid: Option<ListId>,
        from: usize,
        to: usize,
    ) -> Result<Task, TaskOrderError> {
        let current = self.repo.list_tasks(list_uuid)?;
        let len = current.len();
        let moved = current
            .get(from)
            .ok_or(SortKeyError::InvalidIndex { index: from, len })?;
        if moved.is_system_derived() {
            return Err(TaskOrderError::SystemDerivedTask(moved.uuid));
        }
        if to >= len {
            return Err(SortKeyError::InvalidIndex { index: to, len }.into());
        }
        if from == to {
            return Ok(moved.clone());
        }

        let arranged = reposition(&current, from, to);
        self.place(arranged, to, list_uuid)
    }

    fn move_to_list_inner(
        &mut self,
        task_uuid: TaskId,
        target_list: Option<ListId>,
        target_index: Option<usize>,
    ) -> Result<Task, TaskOrderError> {
        let task = self
            .repo
            .get_task(task_uuid, false)?
            .ok_or(TaskOrderError::TaskNotFound(task_uuid))?;
        if task.is_system_derived() {
            return Err(TaskOrderError::SystemDerivedTask(task_uuid));
        }

        let mut arranged = self.repo.list_tasks(target_list)?;
        arranged.retain(|candidate| candidate.uuid != task_uuid);
        let index = clamp_index(target_index, arranged.len());
        arranged.insert(index, task);
        self.place(arranged, index, target_list)
    }

    /// Allocates and persists the key of `arranged[index]`.
    fn place(
        &mut self,
        arranged: Vec<Task>,
        index: usize,
        list_uuid: Option<ListId>,
    ) -> Result<Task, TaskOrderError> {
        let neighbors = resolve_neighbors(&arranged, index, Task::is_active)?;
        let mut task = arranged
            .into_iter()
            .nth(index)
            .ok_or(SortKeyError::InvalidIndex { index, len: 0 })?;

        if neighbors != NeighborKeys::default() {
            task.task_sort = allocate_for_neighbors(neighbors, &self.config, &mut self.rng)?;
        }
        task.list_uuid = list_uuid;
        self.repo
            .update_position(task.uuid, task.list_uuid, task.task_sort)?;
        Ok(task)
    }
}

fn clamp_index(index: Option<usize>, len: usize) -> usize {
    index.map_or(len, |value| value.min(len))
}

fn normalize_title(value: String) -> Result<String, TaskOrderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskOrderError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}

fn log_outcome(event: &str, started_at: Instant, result: &Result<Task, TaskOrderError>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(task) => info!(
            "event={event} module=order status=ok task={} task_sort={} duration_ms={duration_ms}",
            task.uuid, task.task_sort
        ),
        Err(TaskOrderError::Sort(err @ SortKeyError::PrecisionExhausted { .. })) => warn!(
            "event={event} module=order status=error error_code=precision_exhausted duration_ms={duration_ms} error={err}"
        ),
        Err(err) => error!(
            "event={event} module=order status=error duration_ms={duration_ms} error={err}"
        ),
    }
}
