//! Error types for ordering key resolution and allocation.

use crate::ordering::key::OrderKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while resolving neighbors or allocating a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyError {
    /// Moved index is outside the sequence bounds.
    InvalidIndex { index: usize, len: usize },
    /// No decimal value strictly between the bounds could be produced.
    ///
    /// Raised when halving or jitter collapses onto a bound, or when the
    /// arithmetic overflows the decimal range.
    PrecisionExhausted {
        top: Option<OrderKey>,
        next: Option<OrderKey>,
        candidate: Option<OrderKey>,
    },
    /// Both neighbors are present but `top >= next`.
    NeighborsOutOfOrder { top: OrderKey, next: OrderKey },
}

impl Display for SortKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIndex { index, len } => {
                write!(f, "moved index {index} is out of bounds for length {len}")
            }
            Self::PrecisionExhausted {
                top,
                next,
                candidate,
            } => write!(
                f,
                "order key precision exhausted between {} and {} (candidate {})",
                display_bound(top),
                display_bound(next),
                display_bound(candidate)
            ),
            Self::NeighborsOutOfOrder { top, next } => {
                write!(f, "neighbor keys out of order: top {top} >= next {next}")
            }
        }
    }
}

impl Error for SortKeyError {}

fn display_bound(value: &Option<OrderKey>) -> String {
    match value {
        Some(key) => key.to_string(),
        None => "<none>".to_string(),
    }
}
