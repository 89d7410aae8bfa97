use serde::{Deserialize, Serialize};

use super::action::Direction;
use super::config::GameConfig;
use super::entities::{Collectible, EntityId, FoodItem, IdAllocator};
use super::inventory::Inventory;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// |dx| + |dy|
    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// One body cell of the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub id: EntityId,
    pub position: Position,
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Segment>,
    /// Direction committed by the last tick
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize, ids: &mut IdAllocator) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length as i32)
            .map(|i| Segment {
                id: ids.next_id(),
                position: head.moved_by(-dx * i, -dy * i),
            })
            .collect();

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0].position
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Option<Position> {
        self.body.last().map(|segment| segment.position)
    }

    /// Iterate over every occupied cell, head first
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().map(|segment| segment.position)
    }

    /// Whether the snake occupies `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.positions().any(|p| p == pos)
    }

    /// Check if moving the head onto `pos` hits the body.
    ///
    /// The tail is excluded: it vacates its cell during the same move.
    pub fn collides_on_move(&self, pos: Position) -> bool {
        let end = self.body.len().saturating_sub(1);
        self.body
            .get(1..end)
            .is_some_and(|middle| middle.iter().any(|segment| segment.position == pos))
    }

    /// Push a new head in the committed direction, dropping the tail unless growing
    pub fn advance(&mut self, id: EntityId, should_grow: bool) {
        let new_head = self.head().moved_in_direction(self.direction);
        self.body.insert(
            0,
            Segment {
                id,
                position: new_head,
            },
        );

        if !should_grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Ready,
    Playing,
    Paused,
    GameOver,
    Win,
}

impl GameStatus {
    /// GameOver and Win only leave through an explicit restart
    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Win)
    }
}

/// Score and progression counters, mutated only while a tick is handled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    /// Value of collectibles consumed this level
    pub total_value: u32,
    /// Weight of collectibles consumed this level
    pub total_weight: u32,
    pub food_eaten: u32,
    pub collectibles_collected: u32,
    pub current_inventory_weight: u32,
}

impl GameStats {
    pub fn new(high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            level: 1,
            total_value: 0,
            total_weight: 0,
            food_eaten: 0,
            collectibles_collected: 0,
            current_inventory_weight: 0,
        }
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
        self.high_score = self.high_score.max(self.score);
    }

    /// Clear the totals that belong to a single level
    pub fn reset_level_totals(&mut self) {
        self.total_value = 0;
        self.total_weight = 0;
        self.current_inventory_weight = 0;
    }
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Session-wide economy that outlives a single game: coins and the hard
/// inventory capacity they buy. Passed explicitly into every core call that
/// needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub coins: u32,
    pub inventory_capacity: u32,
}

impl SessionContext {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            coins: 0,
            inventory_capacity: config.base_inventory_capacity,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Vec<FoodItem>,
    pub collectibles: Vec<Collectible>,
    pub inventory: Inventory,
    pub stats: GameStats,
    pub status: GameStatus,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Ticks committed since the game started
    pub ticks: u64,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snake,
            food: Vec::new(),
            collectibles: Vec::new(),
            inventory: Inventory::new(),
            stats: GameStats::default(),
            status: GameStatus::Ready,
            grid_width,
            grid_height,
            ticks: 0,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.occupies(pos)
    }

    /// Positions of every outstanding food item and collectible, food first
    pub fn target_positions(&self) -> Vec<Position> {
        self.food
            .iter()
            .map(|f| f.position)
            .chain(self.collectibles.iter().map(|c| c.position))
            .collect()
    }

    pub fn food_at(&self, pos: Position) -> Option<usize> {
        self.food.iter().position(|f| f.position == pos)
    }

    pub fn collectible_at(&self, pos: Position) -> Option<usize> {
        self.collectibles.iter().position(|c| c.position == pos)
    }
}
