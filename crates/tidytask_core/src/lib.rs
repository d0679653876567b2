//! Core domain logic for TidyTask.
//! This crate is the single source of truth for task ordering invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{ListId, Task, TaskId, TaskSource};
pub use ordering::{
    allocate_for_neighbors, allocate_key, allocate_key_with_thread_rng, check_order,
    reposition, resolve_neighbors, ConfigError, JitterRange, NeighborKeys, OrderKey,
    OrderKeyParseError, OrderViolation, OrderedItem, SortKeyConfig, SortKeyError,
};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepoError, TaskRepoResult, TaskRepository};
pub use service::task_order_service::{TaskOrderError, TaskOrderService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
