//! The algorithms the game is built around
//!
//! - Greedy nearest-neighbor route planning (hint mode)
//! - 0/1 knapsack (level gate and inventory reflow)
//! - Traced bubble sort and linear search (inventory replays)

pub mod knapsack;
pub mod route;
pub mod trace;

pub use knapsack::{optimal_value, select_subset, KnapsackItem};
pub use route::plan_route;
pub use trace::{bubble_sort, bubble_sort_by_key, linear_search, SearchStep, SortOrder, SortStep};
