//! Ordering key maintenance.
//!
//! # Responsibility
//! - Assign a list position to an inserted or moved item without
//!   renumbering any other item.
//! - Keep every function pure so callers can use it from any thread.
//!
//! # Invariants
//! - Adjacent eligible items satisfy `key(earlier) < key(later)`.
//! - Keys are exact decimals; binary floats never enter the arithmetic.
//!
//! Typical flow: [`reposition`] builds the proposed arrangement,
//! [`resolve_neighbors`] finds the bounding keys, [`allocate_key`] computes
//! the new key, and the caller persists the single changed record.

pub mod allocator;
pub mod config;
pub mod error;
pub mod invariant;
pub mod key;
pub mod reposition;
pub mod resolver;

pub use allocator::{allocate_for_neighbors, allocate_key, allocate_key_with_thread_rng};
pub use config::{ConfigError, JitterRange, SortKeyConfig};
pub use error::SortKeyError;
pub use invariant::{check_order, OrderViolation};
pub use key::{OrderKey, OrderKeyParseError};
pub use reposition::reposition;
pub use resolver::{resolve_neighbors, NeighborKeys, OrderedItem};
