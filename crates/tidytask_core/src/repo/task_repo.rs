//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist task rows and their list positions.
//! - Return list contents in exact `task_sort` order.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) rows are listed.
//! - Listing order is `task_sort ASC, uuid ASC`, compared as exact decimals.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::{ListId, Task, TaskId, TaskSource};
use crate::ordering::OrderKey;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    list_uuid,
    title,
    task_sort,
    source,
    is_completed,
    is_deleted
FROM tasks";

const REQUIRED_COLUMNS: &[&str] = &[
    "uuid",
    "list_uuid",
    "title",
    "task_sort",
    "source",
    "is_completed",
    "is_deleted",
    "created_at",
    "updated_at",
];

pub type TaskRepoResult<T> = Result<T, TaskRepoError>;

/// Errors from task repository operations.
#[derive(Debug)]
pub enum TaskRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target task does not exist or is soft-deleted.
    NotFound(TaskId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from the tasks table.
    MissingRequiredColumn(&'static str),
    /// Persisted data cannot be converted to a valid task.
    InvalidData(String),
}

impl Display for TaskRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "task repository requires table `{table}`")
            }
            Self::MissingRequiredColumn(column) => {
                write!(f, "task repository requires column `{column}` in table `tasks`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for TaskRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for TaskRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TaskRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator for ordered task lists.
pub trait TaskRepository {
    /// Inserts one task row.
    fn create_task(&self, task: &Task) -> TaskRepoResult<TaskId>;
    /// Loads one task by id.
    fn get_task(&self, id: TaskId, include_deleted: bool) -> TaskRepoResult<Option<Task>>;
    /// Lists active tasks of one list in position order.
    fn list_tasks(&self, list_uuid: Option<ListId>) -> TaskRepoResult<Vec<Task>>;
    /// Persists the list and key of one moved task.
    fn update_position(
        &self,
        id: TaskId,
        list_uuid: Option<ListId>,
        task_sort: OrderKey,
    ) -> TaskRepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> TaskRepoResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> TaskRepoResult<TaskId> {
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                list_uuid,
                title,
                task_sort,
                source,
                is_completed,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                task.uuid.to_string(),
                task.list_uuid.map(|value| value.to_string()),
                task.title.as_str(),
                task.task_sort.to_canonical_string(),
                source_to_db(task.source),
                task.is_completed,
                task.is_deleted,
            ],
        )?;
        Ok(task.uuid)
    }

    fn get_task(&self, id: TaskId, include_deleted: bool) -> TaskRepoResult<Option<Task>> {
        self.conn
            .query_row(
                &format!(
                    "{TASK_SELECT_SQL}
                     WHERE uuid = ?1
                       AND (?2 = 1 OR is_deleted = 0);"
                ),
                params![id.to_string(), include_deleted],
                |row| Ok(parse_task_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_tasks(&self, list_uuid: Option<ListId>) -> TaskRepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE list_uuid IS ?1
               AND is_deleted = 0;"
        ))?;
        let mut rows = stmt.query([list_uuid.map(|value| value.to_string())])?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        tasks.sort_by(|a, b| a.task_sort.cmp(&b.task_sort).then(a.uuid.cmp(&b.uuid)));
        Ok(tasks)
    }

    fn update_position(
        &self,
        id: TaskId,
        list_uuid: Option<ListId>,
        task_sort: OrderKey,
    ) -> TaskRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET list_uuid = ?2,
                 task_sort = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![
                id.to_string(),
                list_uuid.map(|value| value.to_string()),
                task_sort.to_canonical_string(),
            ],
        )?;
        if changed == 0 {
            return Err(TaskRepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> TaskRepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let list_text: Option<String> = row.get("list_uuid")?;
    let sort_text: String = row.get("task_sort")?;
    let source_text: String = row.get("source")?;

    let task_sort = sort_text.parse::<OrderKey>().map_err(|err| {
        TaskRepoError::InvalidData(format!("{err} in tasks.task_sort"))
    })?;
    let source = parse_source(&source_text).ok_or_else(|| {
        TaskRepoError::InvalidData(format!("invalid task source `{source_text}` in tasks.source"))
    })?;

    Ok(Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid")?,
        list_uuid: list_text
            .map(|value| parse_uuid(&value, "tasks.list_uuid"))
            .transpose()?,
        title: row.get("title")?,
        task_sort,
        source,
        is_completed: parse_flag(row.get("is_completed")?, "tasks.is_completed")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "tasks.is_deleted")?,
    })
}

fn source_to_db(source: TaskSource) -> &'static str {
    match source {
        TaskSource::Local => "local",
        TaskSource::Calendar => "calendar",
    }
}

fn parse_source(value: &str) -> Option<TaskSource> {
    match value {
        "local" => Some(TaskSource::Local),
        "calendar" => Some(TaskSource::Calendar),
        _ => None,
    }
}

fn parse_flag(value: i64, column: &'static str) -> TaskRepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(TaskRepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

fn parse_uuid(value: &str, column: &'static str) -> TaskRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| TaskRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_task_connection_ready(conn: &Connection) -> TaskRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(TaskRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tasks'
        );",
        [],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(TaskRepoError::MissingRequiredTable("tasks"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(tasks);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !columns.iter().any(|name| name.as_str() == **column))
    {
        return Err(TaskRepoError::MissingRequiredColumn(*missing));
    }
    Ok(())
}
