//! The collectibles a session is carrying

use crate::algorithms::{bubble_sort_by_key, linear_search, select_subset, SearchStep, SortOrder, SortStep};

use super::entities::{EntityId, InventoryItem};

/// Inventory sort keys offered to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Value,
    Weight,
    CollectedAt,
    Kind,
}

impl SortKey {
    pub fn name(self) -> &'static str {
        match self {
            SortKey::Value => "value",
            SortKey::Weight => "weight",
            SortKey::CollectedAt => "time",
            SortKey::Kind => "type",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Combined weight of everything carried
    pub fn weight(&self) -> u32 {
        self.items.iter().map(|item| item.weight).sum()
    }

    pub fn push(&mut self, item: InventoryItem) {
        self.items.push(item);
    }

    pub fn get(&self, id: EntityId) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Take an item out of the inventory
    pub fn remove(&mut self, id: EntityId) -> Option<InventoryItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Keep the most valuable subset that fits in `capacity`.
    ///
    /// Returns the dropped items; nothing is refunded for them.
    pub fn prune_to(&mut self, capacity: u32) -> Vec<InventoryItem> {
        if self.weight() <= capacity {
            return Vec::new();
        }

        let keep = select_subset(&self.items, capacity);
        let mut kept = Vec::with_capacity(keep.len());
        let mut dropped = Vec::new();
        for (i, item) in self.items.drain(..).enumerate() {
            if keep.binary_search(&i).is_ok() {
                kept.push(item);
            } else {
                dropped.push(item);
            }
        }
        self.items = kept;
        dropped
    }

    /// Reorder the inventory, returning the bubble-sort trace that got there
    pub fn sort(&mut self, key: SortKey, order: SortOrder) -> Vec<SortStep<InventoryItem>> {
        let steps = match key {
            SortKey::Value => bubble_sort_by_key(&self.items, |item| item.value, order),
            SortKey::Weight => bubble_sort_by_key(&self.items, |item| item.weight, order),
            SortKey::CollectedAt => {
                bubble_sort_by_key(&self.items, |item| item.collected_at, order)
            }
            SortKey::Kind => bubble_sort_by_key(&self.items, |item| item.kind, order),
        };

        if let Some(last) = steps.last() {
            self.items = last.array.clone();
        }
        steps
    }

    /// Trace a scan for items whose type name contains `term`, ignoring case
    pub fn search(&self, term: &str) -> Vec<SearchStep<InventoryItem>> {
        let term = term.trim().to_lowercase();
        linear_search(&self.items, |item| {
            item.kind.name().to_lowercase().contains(&term)
        })
    }
}
