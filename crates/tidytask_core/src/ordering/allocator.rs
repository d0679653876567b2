//! Ordering key allocation from neighbor keys.
//!
//! # Responsibility
//! - Compute a new key strictly between the resolved neighbors.
//! - Surface precision exhaustion instead of producing a tie.
//!
//! # Invariants
//! - Result is `> top` when `top` is present and `< next` when `next` is
//!   present.
//! - Bisection paths are deterministic; only boundary paths draw jitter.
//! - No I/O and no shared state.

use crate::ordering::config::SortKeyConfig;
use crate::ordering::error::SortKeyError;
use crate::ordering::key::OrderKey;
use crate::ordering::resolver::NeighborKeys;
use rand::Rng;
use rust_decimal::Decimal;

/// Allocates a key for an item placed between `top` and `next`.
///
/// | top | next | result |
/// |---|---|---|
/// | absent | absent | `default_key` |
/// | absent | `> max_key * 2` | `next - jitter` |
/// | absent | `<= max_key * 2` | `next / 2` |
/// | present | absent | `top + jitter` |
/// | present | present | `(top + next) / 2` |
///
/// # Errors
/// - `NeighborsOutOfOrder` when `top >= next`.
/// - `PrecisionExhausted` when no strictly bounded value can be produced.
pub fn allocate_key<R: Rng + ?Sized>(
    top: Option<OrderKey>,
    next: Option<OrderKey>,
    config: &SortKeyConfig,
    rng: &mut R,
) -> Result<OrderKey, SortKeyError> {
    match (top, next) {
        (None, None) => Ok(config.default_key()),
        (None, Some(next_key)) => allocate_before(next_key, config, rng),
        (Some(top_key), None) => allocate_after(top_key, config, rng),
        (Some(top_key), Some(next_key)) => allocate_between(top_key, next_key),
    }
}

/// Allocates from a resolved neighbor pair.
pub fn allocate_for_neighbors<R: Rng + ?Sized>(
    neighbors: NeighborKeys,
    config: &SortKeyConfig,
    rng: &mut R,
) -> Result<OrderKey, SortKeyError> {
    allocate_key(neighbors.top, neighbors.next, config, rng)
}

/// Same as [`allocate_key`] using the thread-local random source.
pub fn allocate_key_with_thread_rng(
    top: Option<OrderKey>,
    next: Option<OrderKey>,
    config: &SortKeyConfig,
) -> Result<OrderKey, SortKeyError> {
    allocate_key(top, next, config, &mut rand::thread_rng())
}

fn allocate_before<R: Rng + ?Sized>(
    next: OrderKey,
    config: &SortKeyConfig,
    rng: &mut R,
) -> Result<OrderKey, SortKeyError> {
    let value = next.value();
    // Halving only moves toward negative infinity for positive keys.
    let candidate = if next > config.head_bisection_ceiling() || value <= Decimal::ZERO {
        value.checked_sub(config.jitter().draw(rng))
    } else {
        value.checked_div(Decimal::TWO)
    };
    bounded(candidate, None, Some(next))
}

fn allocate_after<R: Rng + ?Sized>(
    top: OrderKey,
    config: &SortKeyConfig,
    rng: &mut R,
) -> Result<OrderKey, SortKeyError> {
    let candidate = top.value().checked_add(config.jitter().draw(rng));
    bounded(candidate, Some(top), None)
}

fn allocate_between(top: OrderKey, next: OrderKey) -> Result<OrderKey, SortKeyError> {
    if top >= next {
        return Err(SortKeyError::NeighborsOutOfOrder { top, next });
    }
    let (low, high) = (top.value(), next.value());
    let candidate = match low.checked_add(high) {
        Some(sum) => sum.checked_div(Decimal::TWO),
        // Sum overflows near the decimal limits; half the gap cannot.
        None => high
            .checked_sub(low)
            .and_then(|gap| gap.checked_div(Decimal::TWO))
            .and_then(|half| low.checked_add(half)),
    };
    bounded(candidate, Some(top), Some(next))
}

fn bounded(
    candidate: Option<Decimal>,
    top: Option<OrderKey>,
    next: Option<OrderKey>,
) -> Result<OrderKey, SortKeyError> {
    let exhausted = |candidate| SortKeyError::PrecisionExhausted {
        top,
        next,
        candidate,
    };
    let key = OrderKey::new(candidate.ok_or_else(|| exhausted(None))?);
    if top.is_some_and(|top| key <= top) || next.is_some_and(|next| key >= next) {
        return Err(exhausted(Some(key)));
    }
    Ok(key)
}
