//! Domain model for ordered task lists.
//!
//! # Responsibility
//! - Define canonical records used by ordering and persistence code.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod task;
