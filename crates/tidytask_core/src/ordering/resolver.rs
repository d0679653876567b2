//! Nearest eligible neighbor lookup.
//!
//! # Responsibility
//! - Find the bounding keys around a provisionally moved item.
//! - Skip entries that cannot serve as bisection bounds.
//!
//! # Invariants
//! - An entry is eligible only when the caller predicate holds and the entry
//!   is not system-derived.
//! - Each scan stops at the first eligible entry or the sequence boundary.

use crate::ordering::error::SortKeyError;
use crate::ordering::key::OrderKey;

/// Record that participates in an ordered list.
pub trait OrderedItem {
    /// Current ordering key.
    fn order_key(&self) -> OrderKey;

    /// Whether the key is mirrored from an external, immutable source.
    ///
    /// System-derived items never act as neighbors.
    fn is_system_derived(&self) -> bool {
        false
    }
}

/// Keys bounding a moved item. `None` means no eligible neighbor exists in
/// that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborKeys {
    /// Nearest eligible key before the moved item.
    pub top: Option<OrderKey>,
    /// Nearest eligible key after the moved item.
    pub next: Option<OrderKey>,
}

/// Resolves the nearest eligible neighbor keys around `moved_index`.
///
/// `items` must already reflect the proposed arrangement, with the moved
/// item placed at `moved_index`.
///
/// # Errors
/// - `InvalidIndex` when `moved_index >= items.len()`.
pub fn resolve_neighbors<T, F>(
    items: &[T],
    moved_index: usize,
    is_eligible: F,
) -> Result<NeighborKeys, SortKeyError>
where
    T: OrderedItem,
    F: Fn(&T) -> bool,
{
    if moved_index >= items.len() {
        return Err(SortKeyError::InvalidIndex {
            index: moved_index,
            len: items.len(),
        });
    }

    let accepts = |item: &&T| !item.is_system_derived() && is_eligible(*item);
    let top = items[..moved_index]
        .iter()
        .rev()
        .find(accepts)
        .map(OrderedItem::order_key);
    let next = items[moved_index + 1..]
        .iter()
        .find(accepts)
        .map(OrderedItem::order_key);

    Ok(NeighborKeys { top, next })
}
