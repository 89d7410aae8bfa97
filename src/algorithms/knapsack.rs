//! 0/1 knapsack over integer weights

use crate::game::{Collectible, InventoryItem};

/// Anything with an integer weight and value
pub trait KnapsackItem {
    fn weight(&self) -> u32;
    fn value(&self) -> u32;
}

impl KnapsackItem for Collectible {
    fn weight(&self) -> u32 {
        self.weight
    }

    fn value(&self) -> u32 {
        self.value
    }
}

impl KnapsackItem for InventoryItem {
    fn weight(&self) -> u32 {
        self.weight
    }

    fn value(&self) -> u32 {
        self.value
    }
}

impl KnapsackItem for (u32, u32) {
    /// `(weight, value)`
    fn weight(&self) -> u32 {
        self.0
    }

    fn value(&self) -> u32 {
        self.1
    }
}

/// Maximum total value reachable without exceeding `capacity`.
///
/// Single-row DP, O(items x capacity) time and O(capacity) space.
pub fn optimal_value<T: KnapsackItem>(items: &[T], capacity: u32) -> u32 {
    let capacity = capacity as usize;
    let mut best = vec![0u32; capacity + 1];

    for item in items {
        let weight = item.weight() as usize;
        if weight > capacity {
            continue;
        }
        for w in (weight..=capacity).rev() {
            best[w] = best[w].max(best[w - weight] + item.value());
        }
    }

    best[capacity]
}

/// Indices (ascending) of a maximum-value subset that fits in `capacity`
pub fn select_subset<T: KnapsackItem>(items: &[T], capacity: u32) -> Vec<usize> {
    let capacity = capacity as usize;
    let n = items.len();
    let mut table = vec![vec![0u32; capacity + 1]; n + 1];

    for (i, item) in items.iter().enumerate() {
        let weight = item.weight() as usize;
        for w in 0..=capacity {
            table[i + 1][w] = if weight <= w {
                table[i][w].max(table[i][w - weight] + item.value())
            } else {
                table[i][w]
            };
        }
    }

    let mut selected = Vec::new();
    let mut w = capacity;
    for i in (1..=n).rev() {
        if table[i][w] != table[i - 1][w] {
            selected.push(i - 1);
            w -= items[i - 1].weight() as usize;
        }
    }

    selected.reverse();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: [(u32, u32); 4] = [(2, 3), (3, 4), (4, 5), (5, 6)];

    #[test]
    fn test_classic_example() {
        assert_eq!(optimal_value(&ITEMS, 5), 7);
    }

    #[test]
    fn test_subset_matches_value() {
        let subset = select_subset(&ITEMS, 5);
        assert_eq!(subset, vec![0, 1]);

        let value: u32 = subset.iter().map(|&i| ITEMS[i].value()).sum();
        let weight: u32 = subset.iter().map(|&i| ITEMS[i].weight()).sum();
        assert_eq!(value, optimal_value(&ITEMS, 5));
        assert!(weight <= 5);
    }

    #[test]
    fn test_zero_capacity_and_empty_items() {
        assert_eq!(optimal_value(&ITEMS, 0), 0);
        assert!(select_subset(&ITEMS, 0).is_empty());

        let none: [(u32, u32); 0] = [];
        assert_eq!(optimal_value(&none, 10), 0);
        assert!(select_subset(&none, 10).is_empty());
    }

    #[test]
    fn test_items_heavier_than_capacity_are_skipped() {
        let items = [(9, 100), (1, 1)];
        assert_eq!(optimal_value(&items, 5), 1);
        assert_eq!(select_subset(&items, 5), vec![1]);
    }

    #[test]
    fn test_each_item_used_once() {
        // Unbounded knapsack would take (1, 2) five times
        let items = [(1, 2), (5, 6)];
        assert_eq!(optimal_value(&items, 5), 6);
    }

    #[test]
    fn test_subset_value_agrees_across_capacities() {
        let items = [(3, 7), (4, 9), (2, 4), (6, 13), (1, 1)];
        for capacity in 0..=16 {
            let subset = select_subset(&items, capacity);
            let value: u32 = subset.iter().map(|&i| items[i].value()).sum();
            let weight: u32 = subset.iter().map(|&i| items[i].weight()).sum();
            assert_eq!(value, optimal_value(&items, capacity), "capacity {}", capacity);
            assert!(weight <= capacity);
        }
    }
}
