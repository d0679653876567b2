//! Task domain model.
//!
//! # Responsibility
//! - Define the task record placed in ordered lists.
//! - Mark calendar-mirrored rows as system-derived for neighbor lookup.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - `task_sort` of a calendar-derived task is owned by the calendar feed.
//! - `is_deleted` is the source of truth for tombstone state.

use crate::ordering::{OrderKey, OrderedItem};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Stable list identifier. `None` in signatures means the inbox.
pub type ListId = Uuid;

/// Origin of a task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    /// Created by the user on this device.
    Local,
    /// Mirrored read-only from the device calendar feed.
    Calendar,
}

/// Task record with its list position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    /// Owning list; `None` is the inbox.
    pub list_uuid: Option<ListId>,
    pub title: String,
    /// Serialized as `taskSort` to match the mobile client schema.
    #[serde(rename = "taskSort")]
    pub task_sort: OrderKey,
    pub source: TaskSource,
    pub is_completed: bool,
    pub is_deleted: bool,
}

impl Task {
    /// Creates a local task with a generated id.
    pub fn new(list_uuid: Option<ListId>, title: impl Into<String>, task_sort: OrderKey) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            list_uuid,
            title: title.into(),
            task_sort,
            source: TaskSource::Local,
            is_completed: false,
            is_deleted: false,
        }
    }

    /// Creates a calendar-mirrored task keeping the feed's key.
    pub fn calendar(
        list_uuid: Option<ListId>,
        title: impl Into<String>,
        task_sort: OrderKey,
    ) -> Self {
        Self {
            source: TaskSource::Calendar,
            ..Self::new(list_uuid, title, task_sort)
        }
    }

    /// Returns whether this task is visible.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

impl OrderedItem for Task {
    fn order_key(&self) -> OrderKey {
        self.task_sort
    }

    fn is_system_derived(&self) -> bool {
        self.source == TaskSource::Calendar
    }
}
