use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the game
///
/// Every tunable of the simulation lives here so that a session can be
/// reproduced from a config file and an RNG seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    // Speed
    /// Tick interval for a fresh snake on level 1, in milliseconds
    pub base_tick_ms: u64,
    /// Fastest allowed tick interval, in milliseconds
    pub min_tick_ms: u64,
    /// Percentage the interval shrinks per level above 1
    pub level_speed_penalty_pct: u64,

    // Capacity threshold (level-scaled)
    /// Maximum collectible weight on level 1
    pub base_weight_threshold: u32,
    /// Extra permitted weight per level
    pub weight_threshold_increment: u32,

    // Waves
    /// Food eaten per level is this plus the level number
    pub base_food_requirement: usize,
    /// Collectibles on every wave
    pub base_collectibles: usize,
    /// Extra collectibles per level
    pub collectibles_per_level: usize,
    /// Cap on the per-level collectible bonus
    pub max_extra_collectibles: usize,

    // Level gate
    /// Fraction of the knapsack optimum needed to pass a level
    pub efficiency_threshold: f64,
    /// Share of the level's collected value paid out as a bonus
    pub level_bonus_pct: u32,
    /// Passing the gate on this level wins the game
    pub win_level: u32,

    // Inventory economy
    /// Hard inventory capacity at session start
    pub base_inventory_capacity: u32,
    /// Capacity bought by one upgrade (also granted per level)
    pub capacity_upgrade_step: u32,
    /// Coins spent per upgrade
    pub capacity_upgrade_cost: u32,

    /// Pending direction changes kept between ticks
    pub max_queued_directions: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 30,
            grid_height: 20,
            initial_snake_length: 3,
            base_tick_ms: 200,
            min_tick_ms: 120,
            level_speed_penalty_pct: 15,
            base_weight_threshold: 10,
            weight_threshold_increment: 5,
            base_food_requirement: 3,
            base_collectibles: 5,
            collectibles_per_level: 3,
            max_extra_collectibles: 10,
            efficiency_threshold: 0.6,
            level_bonus_pct: 20,
            win_level: 10,
            base_inventory_capacity: 10,
            capacity_upgrade_step: 10,
            capacity_upgrade_cost: 10,
            max_queued_directions: 3,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(12, 12)
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(40, 30)
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to deserialize config")?;
        Ok(config)
    }

    /// Level-scaled maximum cumulative collectible weight
    pub fn capacity_threshold(&self, level: u32) -> u32 {
        self.base_weight_threshold + level.saturating_sub(1) * self.weight_threshold_increment
    }

    /// Number of food items a level spawns (and requires eating)
    pub fn food_requirement(&self, level: u32) -> usize {
        self.base_food_requirement + level as usize
    }

    /// Number of collectibles a level spawns
    pub fn collectible_count(&self, level: u32) -> usize {
        let extra = (level as usize * self.collectibles_per_level).min(self.max_extra_collectibles);
        self.base_collectibles + extra
    }

    /// Tick interval for a snake of `snake_len` segments on `level`
    pub fn tick_interval(&self, snake_len: usize, level: u32) -> Duration {
        let base = self
            .base_tick_ms
            .saturating_sub((snake_len as u64 / 3) * 3);
        let penalty =
            base * self.level_speed_penalty_pct * u64::from(level.saturating_sub(1)) / 100;
        Duration::from_millis(base.saturating_sub(penalty).max(self.min_tick_ms))
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width < 10 || self.grid_height < 10 {
            return Err(format!(
                "grid must be at least 10x10, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.initial_snake_length < 2 {
            return Err("initial_snake_length must be at least 2".to_string());
        }

        if self.initial_snake_length > self.grid_width / 2 {
            return Err(format!(
                "initial_snake_length ({}) does not fit in half the grid width ({})",
                self.initial_snake_length, self.grid_width
            ));
        }

        if self.min_tick_ms == 0 || self.min_tick_ms > self.base_tick_ms {
            return Err(format!(
                "min_tick_ms must be in (0, base_tick_ms], got {}",
                self.min_tick_ms
            ));
        }

        if !(0.0..=1.0).contains(&self.efficiency_threshold) {
            return Err(format!(
                "efficiency_threshold must be in [0, 1], got {}",
                self.efficiency_threshold
            ));
        }

        if self.base_weight_threshold == 0 {
            return Err("base_weight_threshold must be positive".to_string());
        }

        if self.win_level == 0 {
            return Err("win_level must be at least 1".to_string());
        }

        if self.max_queued_directions == 0 {
            return Err("max_queued_directions must be at least 1".to_string());
        }

        // The biggest wave plus the snake must leave room on the interior.
        let interior = (self.grid_width - 2) * (self.grid_height - 2);
        let largest_wave = self.food_requirement(self.win_level)
            + self.base_collectibles
            + self.max_extra_collectibles;
        if largest_wave * 2 > interior {
            return Err(format!(
                "waves of up to {} entities crowd a {}-cell interior",
                largest_wave, interior
            ));
        }

        Ok(())
    }
}
