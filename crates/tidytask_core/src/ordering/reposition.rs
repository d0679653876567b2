//! In-memory reposition helper.
//!
//! Materializes the proposed arrangement consumed by the neighbor resolver.
//! Nothing is persisted here.

/// Returns a copy of `items` with the entry at `source` moved to
/// `destination` (remove, then insert).
///
/// Out-of-range indices and `source == destination` return the input
/// unchanged.
pub fn reposition<T: Clone>(items: &[T], source: usize, destination: usize) -> Vec<T> {
    let mut arranged = items.to_vec();
    if source == destination || source >= items.len() || destination >= items.len() {
        return arranged;
    }
    let moved = arranged.remove(source);
    arranged.insert(destination, moved);
    arranged
}
