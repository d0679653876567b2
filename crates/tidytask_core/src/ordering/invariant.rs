//! Ordering invariant check over a materialized list.

use crate::ordering::key::OrderKey;
use crate::ordering::resolver::OrderedItem;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First adjacent eligible pair whose keys are not strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderViolation {
    pub earlier_index: usize,
    pub later_index: usize,
    pub earlier_key: OrderKey,
    pub later_key: OrderKey,
}

impl Display for OrderViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "order violation: item {} ({}) is not below item {} ({})",
            self.earlier_index, self.earlier_key, self.later_index, self.later_key
        )
    }
}

impl Error for OrderViolation {}

/// Verifies `key(earlier) < key(later)` for every adjacent eligible pair.
///
/// System-derived items and items rejected by `is_eligible` are skipped.
pub fn check_order<T, F>(items: &[T], is_eligible: F) -> Result<(), OrderViolation>
where
    T: OrderedItem,
    F: Fn(&T) -> bool,
{
    let mut previous: Option<(usize, OrderKey)> = None;
    for (index, item) in items.iter().enumerate() {
        if item.is_system_derived() || !is_eligible(item) {
            continue;
        }
        let key = item.order_key();
        if let Some((earlier_index, earlier_key)) = previous {
            if earlier_key >= key {
                return Err(OrderViolation {
                    earlier_index,
                    later_index: index,
                    earlier_key,
                    later_key: key,
                });
            }
        }
        previous = Some((index, key));
    }
    Ok(())
}
