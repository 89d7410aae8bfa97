//! Food, collectibles and inventory items with their per-type property tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::Position;

/// Identity of anything placed on the board or held in the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out entity ids in increasing order
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Inclusive value and weight ranges for a food type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodProperties {
    pub min_value: u32,
    pub max_value: u32,
    pub min_weight: u32,
    pub max_weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    Apple,
    Cherry,
    Banana,
    Berry,
}

impl FoodType {
    pub const ALL: [FoodType; 4] = [
        FoodType::Apple,
        FoodType::Cherry,
        FoodType::Banana,
        FoodType::Berry,
    ];

    /// Every food scores a single point; weights differ per type.
    pub const fn properties(self) -> FoodProperties {
        match self {
            FoodType::Apple => FoodProperties {
                min_value: 1,
                max_value: 1,
                min_weight: 5,
                max_weight: 15,
            },
            FoodType::Cherry => FoodProperties {
                min_value: 1,
                max_value: 1,
                min_weight: 2,
                max_weight: 8,
            },
            FoodType::Banana => FoodProperties {
                min_value: 1,
                max_value: 1,
                min_weight: 10,
                max_weight: 25,
            },
            FoodType::Berry => FoodProperties {
                min_value: 1,
                max_value: 1,
                min_weight: 15,
                max_weight: 30,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FoodType::Apple => "Apple",
            FoodType::Cherry => "Cherry",
            FoodType::Banana => "Banana",
            FoodType::Berry => "Berry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CollectibleType {
    Crystal,
    Gem,
    Potion,
    Artifact,
}

impl CollectibleType {
    pub const ALL: [CollectibleType; 4] = [
        CollectibleType::Crystal,
        CollectibleType::Gem,
        CollectibleType::Potion,
        CollectibleType::Artifact,
    ];

    /// Relative spawn weight on `level`. Rare, valuable types gain share as
    /// the level rises while crystals fade towards a floor of 0.1.
    pub fn spawn_weight(self, level: u32) -> f64 {
        let level = f64::from(level);
        match self {
            CollectibleType::Crystal => (0.5 - level * 0.02).max(0.1),
            CollectibleType::Gem => 0.7 + level * 0.05,
            CollectibleType::Potion => 1.2 + level * 0.1,
            CollectibleType::Artifact => 0.9 + level * 0.15,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CollectibleType::Crystal => "Crystal",
            CollectibleType::Gem => "Gem",
            CollectibleType::Potion => "Potion",
            CollectibleType::Artifact => "Artifact",
        }
    }
}

impl fmt::Display for CollectibleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A food item on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: EntityId,
    pub position: Position,
    pub value: u32,
    pub weight: u32,
    pub kind: FoodType,
}

/// A collectible on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: EntityId,
    pub position: Position,
    /// Score awarded on collection
    pub value: u32,
    /// Coins paid when sold from the inventory
    pub sell_value: u32,
    pub weight: u32,
    pub kind: CollectibleType,
}

/// A collectible held in the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: EntityId,
    pub kind: CollectibleType,
    pub value: u32,
    pub weight: u32,
    pub sell_value: u32,
    /// Tick on which the item was collected
    pub collected_at: u64,
}

impl InventoryItem {
    pub fn from_collectible(collectible: &Collectible, collected_at: u64) -> Self {
        Self {
            id: collectible.id,
            kind: collectible.kind,
            value: collectible.value,
            weight: collectible.weight,
            sell_value: collectible.sell_value,
            collected_at,
        }
    }
}
