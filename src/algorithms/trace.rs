//! Bubble sort and linear search that record every step for replay.
//!
//! Each step owns its own copy of the array, so a replay never observes
//! mutations made after the step was recorded.

use std::cmp::Ordering;

/// One recorded moment of a bubble sort
#[derive(Debug, Clone, PartialEq)]
pub struct SortStep<T> {
    pub array: Vec<T>,
    pub compared: (usize, usize),
    pub swapped: bool,
}

/// One recorded moment of a linear search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStep<T> {
    pub array: Vec<T>,
    pub current_index: usize,
    /// Every matching index seen so far, in scan order
    pub found_indices: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Bubble sort a copy of `items`, recording a step for every comparison and
/// another one after every swap. `items` itself is left untouched.
///
/// A pair is swapped when `compare` reports `Greater`, so the last step's
/// array is ordered under `compare`. Inputs shorter than two elements produce
/// no steps.
pub fn bubble_sort<T, F>(items: &[T], mut compare: F) -> Vec<SortStep<T>>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut steps = Vec::new();
    let mut arr = items.to_vec();
    let n = arr.len();

    for i in 0..n {
        for j in 0..n.saturating_sub(i + 1) {
            let swapped = compare(&arr[j], &arr[j + 1]) == Ordering::Greater;

            steps.push(SortStep {
                array: arr.clone(),
                compared: (j, j + 1),
                swapped,
            });

            if swapped {
                arr.swap(j, j + 1);
                steps.push(SortStep {
                    array: arr.clone(),
                    compared: (j, j + 1),
                    swapped: true,
                });
            }
        }
    }

    steps
}

/// [`bubble_sort`] by a key in the given direction
pub fn bubble_sort_by_key<T, K, F>(items: &[T], mut key: F, order: SortOrder) -> Vec<SortStep<T>>
where
    T: Clone,
    K: Ord,
    F: FnMut(&T) -> K,
{
    bubble_sort(items, |a, b| order.apply(key(a).cmp(&key(b))))
}

/// Scan `items` left to right, recording one step per index with every match
/// found so far. The scan never stops early.
pub fn linear_search<T, P>(items: &[T], mut predicate: P) -> Vec<SearchStep<T>>
where
    T: Clone,
    P: FnMut(&T) -> bool,
{
    let mut found_indices = Vec::new();

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if predicate(item) {
                found_indices.push(i);
            }
            SearchStep {
                array: items.to_vec(),
                current_index: i,
                found_indices: found_indices.clone(),
            }
        })
        .collect()
}
