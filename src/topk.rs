//! Top-K selection
//!
//! **Problem**: sorting every model to take the best few is O(N log N).
//!
//! **Solution**: bounded heap selection, O(N log K) time and O(K) space.
//!
//! Ties are broken by position: for equal scores the item that appears
//! earlier in the input ranks higher, in both sort orders. Output is
//! therefore deterministic for a given input order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Sort order for Top-K selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (smallest K values)
    Ascending,
    /// Descending order (largest K values)
    Descending,
}

/// Heap entry. `Ord` puts the *worst* retained candidate on top so it is
/// the one evicted when a better item arrives.
#[derive(Debug)]
struct HeapItem {
    score: f64,
    index: usize,
    order: SortOrder,
}

impl HeapItem {
    /// Ranking order: `Less` means `self` ranks before `other`.
    fn rank(&self, other: &Self) -> Ordering {
        let by_score = match self.order {
            SortOrder::Descending => other.score.total_cmp(&self.score),
            SortOrder::Ascending => self.score.total_cmp(&other.score),
        };
        by_score.then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on rank: worst-ranked item at the top
        self.rank(other)
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the indices of the top `k` items by `score`.
///
/// Items for which `score` returns `None` are not candidates. Indices come
/// back best first.
///
/// # Examples
///
/// ```rust
/// use provenance_db::topk::{select_top_k, SortOrder};
///
/// let scores = [0.7, 0.9, 0.8, 0.9];
/// let top = select_top_k(&scores, 3, SortOrder::Descending, |s| Some(*s));
/// assert_eq!(top, vec![1, 3, 2]);
/// ```
pub fn select_top_k<T, F>(items: &[T], k: usize, order: SortOrder, score: F) -> Vec<usize>
where
    F: Fn(&T) -> Option<f64>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<HeapItem> = BinaryHeap::with_capacity(k.min(items.len()));
    for (index, item) in items.iter().enumerate() {
        let Some(value) = score(item) else {
            continue;
        };
        let candidate = HeapItem {
            score: value,
            index,
            order,
        };

        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(worst) = heap.peek() {
            if candidate.rank(worst) == Ordering::Less {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|item| item.index)
        .collect()
}

/// Clone the top `k` items by `score`, best first.
pub fn top_k_by<T, F>(items: &[T], k: usize, order: SortOrder, score: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> Option<f64>,
{
    select_top_k(items, k, order, score)
        .into_iter()
        .map(|index| items[index].clone())
        .collect()
}
