//! Entity generation: places food and collectibles on free interior cells.

use std::collections::HashSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use super::config::GameConfig;
use super::entities::{Collectible, CollectibleType, FoodItem, FoodType, IdAllocator};
use super::error::GeneratorError;
use super::state::{Position, Snake};

/// Random probes per interior cell before falling back to enumeration
const SPAWN_ATTEMPTS_PER_CELL: usize = 4;

/// Extra weight a collectible may carry beyond the hard capacity
const COLLECTIBLE_WEIGHT_MARGIN: u32 = 5;

/// Everything currently occupying the board
#[derive(Debug, Clone, Copy)]
pub struct Board<'a> {
    pub snake: &'a Snake,
    pub food: &'a [FoodItem],
    pub collectibles: &'a [Collectible],
    pub width: usize,
    pub height: usize,
}

impl Board<'_> {
    fn occupied(&self) -> HashSet<Position> {
        self.snake
            .positions()
            .chain(self.food.iter().map(|f| f.position))
            .chain(self.collectibles.iter().map(|c| c.position))
            .collect()
    }

    fn no_free_cell(&self) -> GeneratorError {
        GeneratorError::NoFreeCell {
            width: self.width,
            height: self.height,
        }
    }
}

/// Pick a uniformly random unoccupied cell away from the walls.
///
/// Rejection sampling is bounded; once the probes run out the free cells are
/// enumerated, so a full board fails instead of spinning.
pub fn free_cell<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Result<Position, GeneratorError> {
    if board.width < 3 || board.height < 3 {
        return Err(board.no_free_cell());
    }

    let occupied = board.occupied();
    let xs = 1..board.width as i32 - 1;
    let ys = 1..board.height as i32 - 1;
    let interior = (board.width - 2) * (board.height - 2);

    for _ in 0..interior * SPAWN_ATTEMPTS_PER_CELL {
        let pos = Position::new(rng.gen_range(xs.clone()), rng.gen_range(ys.clone()));
        if !occupied.contains(&pos) {
            return Ok(pos);
        }
    }

    let free: Vec<Position> = ys
        .flat_map(|y| xs.clone().map(move |x| Position::new(x, y)))
        .filter(|pos| !occupied.contains(pos))
        .collect();

    free.choose(rng).copied().ok_or_else(|| board.no_free_cell())
}

/// Spawn one food item of a uniformly chosen type
pub fn generate_food<R: Rng + ?Sized>(
    board: &Board,
    ids: &mut IdAllocator,
    rng: &mut R,
) -> Result<FoodItem, GeneratorError> {
    let position = free_cell(board, rng)?;
    let kind = FoodType::ALL[rng.gen_range(0..FoodType::ALL.len())];
    let props = kind.properties();

    Ok(FoodItem {
        id: ids.next_id(),
        position,
        value: rng.gen_range(props.min_value..=props.max_value),
        weight: rng.gen_range(props.min_weight..=props.max_weight),
        kind,
    })
}

/// Spawn one collectible scaled to `level`.
///
/// `capacity` is the session's hard inventory capacity; the weight is bounded
/// by it (plus a small margin) and by the level's threshold.
pub fn generate_collectible<R: Rng + ?Sized>(
    board: &Board,
    level: u32,
    capacity: u32,
    config: &GameConfig,
    ids: &mut IdAllocator,
    rng: &mut R,
) -> Result<Collectible, GeneratorError> {
    let position = free_cell(board, rng)?;
    let kind = pick_collectible_type(level, rng);

    let max_weight = (capacity + COLLECTIBLE_WEIGHT_MARGIN)
        .min(config.base_weight_threshold + level * config.weight_threshold_increment)
        .max(1);
    let weight = rng.gen_range(1..=max_weight);

    let base_value = weight * 4 / 5;
    let level_bonus = base_value * level / 10;
    let value = base_value + level_bonus;

    Ok(Collectible {
        id: ids.next_id(),
        position,
        value,
        sell_value: value / 2,
        weight,
        kind,
    })
}

fn pick_collectible_type<R: Rng + ?Sized>(level: u32, rng: &mut R) -> CollectibleType {
    let weights = CollectibleType::ALL.map(|kind| kind.spawn_weight(level));
    match WeightedIndex::new(weights) {
        Ok(dist) => CollectibleType::ALL[dist.sample(rng)],
        Err(_) => CollectibleType::Crystal,
    }
}

/// Food and collectibles for a fresh level
#[derive(Debug, Clone, Default)]
pub struct Wave {
    pub food: Vec<FoodItem>,
    pub collectibles: Vec<Collectible>,
}

/// Spawn the full wave for `level` around the snake
pub fn generate_wave<R: Rng + ?Sized>(
    snake: &Snake,
    level: u32,
    capacity: u32,
    config: &GameConfig,
    ids: &mut IdAllocator,
    rng: &mut R,
) -> Result<Wave, GeneratorError> {
    let mut wave = Wave::default();

    for _ in 0..config.food_requirement(level) {
        let board = Board {
            snake,
            food: &wave.food,
            collectibles: &wave.collectibles,
            width: config.grid_width,
            height: config.grid_height,
        };
        let item = generate_food(&board, ids, rng)?;
        wave.food.push(item);
    }

    for _ in 0..config.collectible_count(level) {
        let board = Board {
            snake,
            food: &wave.food,
            collectibles: &wave.collectibles,
            width: config.grid_width,
            height: config.grid_height,
        };
        let item = generate_collectible(&board, level, capacity, config, ids, rng)?;
        wave.collectibles.push(item);
    }

    Ok(wave)
}
