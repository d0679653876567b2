//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose ordering and task-move use cases to Dart via FRB.
//! - Exchange order keys as canonical decimal strings so the desktop and
//!   mobile clients agree on every value.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in response envelopes, never thrown.

use tidytask_core::db::open_db;
use tidytask_core::{
    allocate_key_with_thread_rng, core_version as core_version_inner,
    init_logging as init_logging_inner, ping as ping_inner, resolve_neighbors, ListId,
    OrderKey, OrderedItem, SortKeyConfig, SqliteTaskRepository, Task, TaskOrderError,
    TaskOrderService,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const TASK_DB_FILE_NAME: &str = "tidytask.sqlite3";
static TASK_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result of one key allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKeyResponse {
    pub ok: bool,
    /// Canonical decimal text of the new key.
    pub task_sort: Option<String>,
    pub message: String,
}

/// One row of a materialized list as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedEntry {
    /// Canonical decimal text of the row key.
    pub task_sort: String,
    /// Calendar-mirrored rows are never neighbors.
    pub is_system_derived: bool,
    /// Caller-side eligibility (e.g. visible under the active filter).
    pub is_eligible: bool,
}

/// Result of neighbor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborKeysResponse {
    pub ok: bool,
    pub top: Option<String>,
    pub next: Option<String>,
    pub message: String,
}

/// Task summary returned to the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListItem {
    pub task_id: String,
    pub title: String,
    pub task_sort: String,
    pub is_calendar: bool,
}

/// Ordered list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskListItem>,
    pub message: String,
}

/// Generic response for task create/move actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub task_id: Option<String>,
    pub task_sort: Option<String>,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: &Task) -> Self {
        Self {
            ok: true,
            task_id: Some(task.uuid.to_string()),
            task_sort: Some(task.task_sort.to_canonical_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            task_sort: None,
            message: message.into(),
        }
    }
}

/// Computes a key between two optional neighbor keys with default config.
#[flutter_rust_bridge::frb(sync)]
pub fn allocate_sort_key(top: Option<String>, next: Option<String>) -> SortKeyResponse {
    let allocated = parse_optional_key(top)
        .and_then(|top| Ok((top, parse_optional_key(next)?)))
        .and_then(|(top, next)| {
            allocate_key_with_thread_rng(top, next, &SortKeyConfig::default())
                .map_err(|err| err.to_string())
        });
    match allocated {
        Ok(key) => SortKeyResponse {
            ok: true,
            task_sort: Some(key.to_canonical_string()),
            message: String::new(),
        },
        Err(err) => SortKeyResponse {
            ok: false,
            task_sort: None,
            message: format!("allocate_sort_key failed: {err}"),
        },
    }
}

/// Resolves neighbor keys around `moved_index` of a UI-side arrangement.
#[flutter_rust_bridge::frb(sync)]
pub fn resolve_neighbor_keys(items: Vec<OrderedEntry>, moved_index: u32) -> NeighborKeysResponse {
    let resolved = items
        .iter()
        .map(ParsedEntry::try_from)
        .collect::<Result<Vec<_>, String>>()
        .and_then(|entries| {
            resolve_neighbors(&entries, moved_index as usize, |entry| entry.is_eligible)
                .map_err(|err| err.to_string())
        });
    match resolved {
        Ok(pair) => NeighborKeysResponse {
            ok: true,
            top: pair.top.map(|key| key.to_canonical_string()),
            next: pair.next.map(|key| key.to_canonical_string()),
            message: String::new(),
        },
        Err(err) => NeighborKeysResponse {
            ok: false,
            top: None,
            next: None,
            message: format!("resolve_neighbor_keys failed: {err}"),
        },
    }
}

/// Lists active tasks of one list (`None` = inbox) in position order.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(list_id: Option<String>) -> TaskListResponse {
    let listed = parse_list_id(list_id)
        .and_then(|list| with_order_service(|service| service.list_tasks(list)));
    match listed {
        Ok(tasks) => TaskListResponse {
            ok: true,
            message: format!("Found {} task(s).", tasks.len()),
            items: tasks.iter().map(to_task_list_item).collect(),
        },
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("task_list failed: {err}"),
        },
    }
}

/// Creates a task at `index` of a list; `None` appends.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(list_id: Option<String>, title: String, index: Option<u32>) -> TaskActionResponse {
    let created = parse_list_id(list_id).and_then(|list| {
        with_order_service(|service| {
            service.insert_task(list, title, index.map(|value| value as usize))
        })
    });
    match created {
        Ok(task) => TaskActionResponse::success("Task created.", &task),
        Err(err) => TaskActionResponse::failure(format!("task_create failed: {err}")),
    }
}

/// Moves a task to `target_index` of `target_list_id`; `None` appends.
#[flutter_rust_bridge::frb(sync)]
pub fn task_move(
    task_id: String,
    target_list_id: Option<String>,
    target_index: Option<u32>,
) -> TaskActionResponse {
    let moved = Uuid::parse_str(task_id.trim())
        .map_err(|_| format!("invalid task id `{task_id}`"))
        .and_then(|task_uuid| Ok((task_uuid, parse_list_id(target_list_id)?)))
        .and_then(|(task_uuid, list)| {
            with_order_service(|service| {
                service.move_to_list(task_uuid, list, target_index.map(|value| value as usize))
            })
        });
    match moved {
        Ok(task) => TaskActionResponse::success("Task moved.", &task),
        Err(err) => TaskActionResponse::failure(format!("task_move failed: {err}")),
    }
}

struct ParsedEntry {
    key: OrderKey,
    is_system_derived: bool,
    is_eligible: bool,
}

impl TryFrom<&OrderedEntry> for ParsedEntry {
    type Error = String;

    fn try_from(entry: &OrderedEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            key: entry.task_sort.parse().map_err(|err| format!("{err}"))?,
            is_system_derived: entry.is_system_derived,
            is_eligible: entry.is_eligible,
        })
    }
}

impl OrderedItem for ParsedEntry {
    fn order_key(&self) -> OrderKey {
        self.key
    }

    fn is_system_derived(&self) -> bool {
        self.is_system_derived
    }
}

fn parse_optional_key(raw: Option<String>) -> Result<Option<OrderKey>, String> {
    raw.map(|value| value.parse::<OrderKey>().map_err(|err| err.to_string()))
        .transpose()
}

fn parse_list_id(raw: Option<String>) -> Result<Option<ListId>, String> {
    raw.map(|value| {
        Uuid::parse_str(value.trim()).map_err(|_| format!("invalid list id `{value}`"))
    })
    .transpose()
}

fn resolve_task_db_path() -> PathBuf {
    TASK_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TIDYTASK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(TASK_DB_FILE_NAME)
        })
        .clone()
}

fn with_order_service<T>(
    f: impl FnOnce(&mut TaskOrderService<SqliteTaskRepository<'_>>) -> Result<T, TaskOrderError>,
) -> Result<T, String> {
    let conn = open_db(resolve_task_db_path()).map_err(|err| format!("task DB open failed: {err}"))?;
    let repo = SqliteTaskRepository::try_new(&conn)
        .map_err(|err| format!("task repo init failed: {err}"))?;
    let mut service = TaskOrderService::new(repo, SortKeyConfig::default());
    f(&mut service).map_err(|err| err.to_string())
}

fn to_task_list_item(task: &Task) -> TaskListItem {
    TaskListItem {
        task_id: task.uuid.to_string(),
        title: task.title.clone(),
        task_sort: task.task_sort.to_canonical_string(),
        is_calendar: task.is_system_derived(),
    }
}
