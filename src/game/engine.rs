use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use super::{
    action::Direction,
    config::GameConfig,
    entities::{CollectibleType, EntityId, IdAllocator, InventoryItem},
    error::{GameOverReason, GeneratorError},
    generator::generate_wave,
    progression::{evaluate_level, LevelOutcome},
    state::{GameState, GameStats, GameStatus, Position, SessionContext, Snake},
};

/// Something that happened during a step
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    FoodEaten {
        id: EntityId,
        value: u32,
    },
    CollectibleCollected {
        id: EntityId,
        kind: CollectibleType,
        value: u32,
        stored: bool,
    },
    /// A collectible was consumed but did not fit in the inventory
    InventoryFull {
        id: EntityId,
    },
    LevelUp {
        level: u32,
        bonus: u32,
        efficiency: f64,
    },
    Won {
        bonus: u32,
    },
    GameOver(GameOverReason),
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    /// Whether anything was consumed this step
    pub consumed: bool,
    /// Everything that happened, in order
    pub events: Vec<GameEvent>,
}

/// The game engine that handles all game logic
pub struct GameEngine<R: Rng = StdRng> {
    config: GameConfig,
    rng: R,
    ids: IdAllocator,
}

impl GameEngine<StdRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose spawns are reproducible
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            ids: IdAllocator::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Build a fresh level-1 game in the Ready state
    pub fn reset(&mut self, ctx: &SessionContext, high_score: u32) -> Result<GameState, GeneratorError> {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
            &mut self.ids,
        );

        let wave = generate_wave(
            &snake,
            1,
            ctx.inventory_capacity,
            &self.config,
            &mut self.ids,
            &mut self.rng,
        )?;

        let mut state = GameState::new(snake, self.config.grid_width, self.config.grid_height);
        state.food = wave.food;
        state.collectibles = wave.collectibles;
        state.stats = GameStats::new(high_score);
        Ok(state)
    }

    /// Execute one tick of the game.
    ///
    /// A finished level is evaluated before the snake moves. Failures never
    /// escape: they end the game and are reported as a `GameOver` event.
    pub fn step(
        &mut self,
        state: &mut GameState,
        direction: Option<Direction>,
        ctx: &mut SessionContext,
    ) -> StepResult {
        if state.status != GameStatus::Playing {
            return StepResult {
                terminated: state.status.is_finished(),
                ..Default::default()
            };
        }

        let mut result = StepResult::default();

        if state.food.is_empty() && !self.finish_level(state, ctx, &mut result) {
            result.terminated = true;
            return result;
        }

        // Update direction (prevent 180° turns)
        if let Some(new_direction) = direction {
            if !state.snake.direction.is_opposite(new_direction) {
                state.snake.direction = new_direction;
            }
        }

        // Calculate new head position
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        // Check for collisions
        if let Some(reason) = self.check_collision(state, new_head) {
            self.end_game(state, reason, &mut result);
            return result;
        }

        let eaten_food = state.food_at(new_head);
        let eaten_collectible = state.collectible_at(new_head);

        if let Some(index) = eaten_collectible {
            let weight = state.collectibles[index].weight;
            let carried = state.inventory.weight() + weight;
            let threshold = self.config.capacity_threshold(state.stats.level);
            if carried > threshold {
                self.end_game(
                    state,
                    GameOverReason::CapacityExceeded {
                        weight: carried,
                        threshold,
                    },
                    &mut result,
                );
                return result;
            }
        }

        // Any consumption grows the snake by one segment
        let consumed = eaten_food.is_some() || eaten_collectible.is_some();
        state.snake.advance(self.ids.next_id(), consumed);
        state.ticks += 1;
        result.consumed = consumed;

        if let Some(index) = eaten_food {
            let food = state.food.remove(index);
            state.stats.add_score(food.value);
            state.stats.food_eaten += 1;
            debug!("Ate {} {} (+{})", food.kind.name(), food.id, food.value);
            result.events.push(GameEvent::FoodEaten {
                id: food.id,
                value: food.value,
            });
        }

        if let Some(index) = eaten_collectible {
            let collectible = state.collectibles.remove(index);
            let stats = &mut state.stats;
            stats.add_score(collectible.value);
            stats.total_value += collectible.value;
            stats.total_weight += collectible.weight;
            stats.collectibles_collected += 1;

            let stored = state.inventory.weight() + collectible.weight <= ctx.inventory_capacity;
            if stored {
                state
                    .inventory
                    .push(InventoryItem::from_collectible(&collectible, state.ticks));
            } else {
                warn!(
                    "Inventory full ({}/{}), {} not stored",
                    state.inventory.weight(),
                    ctx.inventory_capacity,
                    collectible.id
                );
                result
                    .events
                    .push(GameEvent::InventoryFull { id: collectible.id });
            }
            state.stats.current_inventory_weight = state.inventory.weight();

            debug!(
                "Collected {} {} (value {}, weight {})",
                collectible.kind, collectible.id, collectible.value, collectible.weight
            );
            result.events.push(GameEvent::CollectibleCollected {
                id: collectible.id,
                kind: collectible.kind,
                value: collectible.value,
                stored,
            });
        }

        result
    }

    /// Run the level gate. Returns false when the game ended (failure or win).
    fn finish_level(
        &mut self,
        state: &mut GameState,
        ctx: &mut SessionContext,
        result: &mut StepResult,
    ) -> bool {
        match evaluate_level(&self.config, &state.stats, &state.collectibles) {
            LevelOutcome::Fail(reason) => {
                self.end_game(state, reason, result);
                false
            }
            LevelOutcome::Win { bonus, .. } => {
                state.stats.add_score(bonus);
                state.status = GameStatus::Win;
                info!("Won on level {} with score {}", state.stats.level, state.stats.score);
                result.events.push(GameEvent::Won { bonus });
                false
            }
            LevelOutcome::Advance { bonus, efficiency } => {
                let stats = &mut state.stats;
                stats.level += 1;
                stats.add_score(bonus);
                stats.reset_level_totals();
                state.inventory.clear();
                ctx.inventory_capacity += self.config.capacity_upgrade_step;

                let level = state.stats.level;
                match generate_wave(
                    &state.snake,
                    level,
                    ctx.inventory_capacity,
                    &self.config,
                    &mut self.ids,
                    &mut self.rng,
                ) {
                    Ok(wave) => {
                        state.food = wave.food;
                        state.collectibles = wave.collectibles;
                    }
                    Err(err) => {
                        error!("Could not spawn level {}: {}", level, err);
                        self.end_game(state, err.into(), result);
                        return false;
                    }
                }

                info!(
                    "Level {} reached (efficiency {:.1}%, bonus {})",
                    level,
                    efficiency * 100.0,
                    bonus
                );
                result.events.push(GameEvent::LevelUp {
                    level,
                    bonus,
                    efficiency,
                });
                true
            }
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<GameOverReason> {
        // Check wall collision
        if !state.is_in_bounds(pos) {
            return Some(GameOverReason::WallCollision);
        }

        // Check self-collision
        if state.snake.collides_on_move(pos) {
            return Some(GameOverReason::SelfCollision);
        }

        None
    }

    fn end_game(&self, state: &mut GameState, reason: GameOverReason, result: &mut StepResult) {
        info!("Game over on level {}: {}", state.stats.level, reason);
        state.status = GameStatus::GameOver;
        result.terminated = true;
        result.events.push(GameEvent::GameOver(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Collectible, FoodItem, FoodType};
    use std::collections::HashSet;

    fn engine() -> GameEngine {
        GameEngine::seeded(GameConfig::new(20, 20), 42)
    }

    /// A playing state with the snake at (10,10) heading right and an empty board
    fn bare_state(engine: &mut GameEngine, length: usize) -> GameState {
        let snake = Snake::new(
            Position::new(10, 10),
            Direction::Right,
            length,
            &mut engine.ids,
        );
        let mut state = GameState::new(snake, 20, 20);
        state.status = GameStatus::Playing;
        // keep the level gate quiet
        state.food.push(food(900, Position::new(1, 1), 1));
        state
    }

    fn food(id: u64, position: Position, value: u32) -> FoodItem {
        FoodItem {
            id: EntityId(id),
            position,
            value,
            weight: 5,
            kind: FoodType::Apple,
        }
    }

    fn collectible(id: u64, position: Position, weight: u32, value: u32) -> Collectible {
        Collectible {
            id: EntityId(id),
            position,
            value,
            sell_value: value / 2,
            weight,
            kind: CollectibleType::Gem,
        }
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        let ctx = SessionContext::new(engine.config());
        let state = engine.reset(&ctx, 12).unwrap();

        assert_eq!(state.status, GameStatus::Ready);
        assert_eq!(state.stats.score, 0);
        assert_eq!(state.stats.high_score, 12);
        assert_eq!(state.stats.level, 1);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), Position::new(10, 10));
        assert_eq!(state.food.len(), engine.config().food_requirement(1));
        assert_eq!(state.collectibles.len(), engine.config().collectible_count(1));
    }

    #[test]
    fn test_ready_state_does_not_move() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let mut state = engine.reset(&ctx, 0).unwrap();
        let head = state.snake.head();

        let result = engine.step(&mut state, None, &mut ctx);
        assert!(!result.terminated);
        assert_eq!(state.snake.head(), head);
        assert_eq!(state.ticks, 0);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let mut state = bare_state(&mut engine, 3);

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(!result.terminated);
        assert!(!result.consumed);
        assert_eq!(state.ticks, 1);
        assert_eq!(state.snake.head(), Position::new(11, 10));
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_food_consumption_end_to_end() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let mut state = bare_state(&mut engine, 3);
        state.food.push(food(1, Position::new(11, 10), 1));

        let result = engine.step(&mut state, Some(Direction::Right), &mut ctx);

        assert!(!result.terminated);
        assert!(result.consumed);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.stats.score, 1);
        assert_eq!(state.stats.food_eaten, 1);
        assert!(state.food_at(Position::new(11, 10)).is_none());
        assert!(!result
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver(_))));
    }

    #[test]
    fn test_collectible_grows_and_stores() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let mut state = bare_state(&mut engine, 3);
        state
            .collectibles
            .push(collectible(2, Position::new(11, 10), 4, 3));

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(result.consumed);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.stats.score, 3);
        assert_eq!(state.stats.total_value, 3);
        assert_eq!(state.stats.total_weight, 4);
        assert_eq!(state.stats.current_inventory_weight, 4);
        assert_eq!(state.inventory.len(), 1);
        assert!(state.collectibles.is_empty());
    }

    #[test]
    fn test_collectible_over_threshold_ends_game() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let mut state = bare_state(&mut engine, 3);
        // level 1 threshold is 10
        state
            .collectibles
            .push(collectible(2, Position::new(11, 10), 11, 8));

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(result.terminated);
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(
            result.events,
            vec![GameEvent::GameOver(GameOverReason::CapacityExceeded {
                weight: 11,
                threshold: 10
            })]
        );
    }

    #[test]
    fn test_collectible_over_hard_capacity_is_lost() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        ctx.inventory_capacity = 3;
        let mut state = bare_state(&mut engine, 3);
        state
            .collectibles
            .push(collectible(2, Position::new(11, 10), 4, 3));

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(!result.terminated);
        assert!(result
            .events
            .contains(&GameEvent::InventoryFull { id: EntityId(2) }));
        assert!(state.inventory.is_empty());
        assert_eq!(state.stats.total_value, 3);
        assert_eq!(state.stats.current_inventory_weight, 0);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 3, &mut engine.ids);
        let mut state = GameState::new(snake, 20, 20);
        state.status = GameStatus::Playing;
        state.food.push(food(1, Position::new(5, 5), 1));

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(result.terminated);
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(
            result.events,
            vec![GameEvent::GameOver(GameOverReason::WallCollision)]
        );
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        // Body: (10,10), (9,10), (8,10), (7,10), (6,10)
        let mut state = bare_state(&mut engine, 5);

        engine.step(&mut state, Some(Direction::Down), &mut ctx);
        engine.step(&mut state, Some(Direction::Left), &mut ctx);
        let result = engine.step(&mut state, Some(Direction::Up), &mut ctx);

        assert!(result.terminated);
        assert_eq!(
            result.events,
            vec![GameEvent::GameOver(GameOverReason::SelfCollision)]
        );
    }

    #[test]
    fn test_moving_into_vacating_tail_is_safe() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        // Square loop: length 4 snake can chase its own tail forever
        let mut state = bare_state(&mut engine, 4);

        for dir in [Direction::Down, Direction::Left, Direction::Up, Direction::Right] {
            let result = engine.step(&mut state, Some(dir), &mut ctx);
            assert!(!result.terminated, "died turning {:?}", dir);
        }
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let mut state = bare_state(&mut engine, 3);

        engine.step(&mut state, Some(Direction::Left), &mut ctx);

        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(state.snake.head(), Position::new(11, 10));
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let mut state = bare_state(&mut engine, 3);
        state.status = GameStatus::GameOver;
        let ticks_before = state.ticks;

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(result.terminated);
        assert_eq!(state.ticks, ticks_before);
    }

    #[test]
    fn test_level_gate_runs_before_moving() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        // Head against the right wall so the move after the gate is fatal
        let snake = Snake::new(Position::new(19, 10), Direction::Right, 3, &mut engine.ids);
        let mut state = GameState::new(snake, 20, 20);
        state.status = GameStatus::Playing;
        state.stats.total_value = 10;
        state
            .inventory
            .push(InventoryItem::from_collectible(&collectible(5, Position::new(2, 2), 2, 10), 0));
        let capacity_before = ctx.inventory_capacity;

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(matches!(
            result.events.as_slice(),
            [
                GameEvent::LevelUp { level: 2, bonus: 2, .. },
                GameEvent::GameOver(GameOverReason::WallCollision)
            ]
        ));
        assert_eq!(state.stats.level, 2);
        assert_eq!(state.stats.score, 2);
        assert_eq!(state.stats.total_value, 0);
        assert!(state.inventory.is_empty());
        assert_eq!(ctx.inventory_capacity, capacity_before + 10);
        assert_eq!(state.food.len(), engine.config().food_requirement(2));
        assert_eq!(state.collectibles.len(), engine.config().collectible_count(2));
    }

    #[test]
    fn test_level_gate_failure() {
        let mut engine = GameEngine::seeded(
            GameConfig {
                base_weight_threshold: 5,
                ..GameConfig::new(20, 20)
            },
            1,
        );
        let mut ctx = SessionContext::new(engine.config());
        let mut state = bare_state(&mut engine, 3);
        state.food.clear();
        state.stats.score = 4;
        for (i, (w, v)) in [(2, 3), (3, 4), (4, 5), (5, 6)].into_iter().enumerate() {
            state
                .collectibles
                .push(collectible(i as u64, Position::new(2 + i as i32, 2), w, v));
        }

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(result.terminated);
        assert_eq!(state.status, GameStatus::GameOver);
        assert!(matches!(
            result.events.as_slice(),
            [GameEvent::GameOver(GameOverReason::EfficiencyBelowThreshold { .. })]
        ));
        assert_eq!(state.snake.head(), Position::new(10, 10));
    }

    #[test]
    fn test_win_on_final_level() {
        let mut engine = GameEngine::seeded(
            GameConfig {
                win_level: 1,
                ..GameConfig::new(20, 20)
            },
            1,
        );
        let mut ctx = SessionContext::new(engine.config());
        let mut state = bare_state(&mut engine, 3);
        state.food.clear();

        let result = engine.step(&mut state, None, &mut ctx);

        assert!(result.terminated);
        assert_eq!(state.status, GameStatus::Win);
    }

    #[test]
    fn test_random_play_keeps_invariants() {
        let mut engine = engine();
        let mut ctx = SessionContext::new(engine.config());
        let mut state = engine.reset(&ctx, 0).unwrap();
        state.status = GameStatus::Playing;
        let mut rng = StdRng::seed_from_u64(5);
        let dirs = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

        for _ in 0..500 {
            if state.status != GameStatus::Playing {
                break;
            }
            let before_head = state.snake.head();
            let before_dir = state.snake.direction;
            let level_before = state.stats.level;
            let dir = dirs[rng.gen_range(0..4)];

            let result = engine.step(&mut state, Some(dir), &mut ctx);
            if result.terminated {
                break;
            }

            // committed direction never reverses
            assert!(!state.snake.direction.is_opposite(before_dir));
            if state.stats.level == level_before {
                assert_eq!(
                    state.snake.head(),
                    before_head.moved_in_direction(state.snake.direction)
                );
            }

            // no two entities share a cell
            let mut seen = HashSet::new();
            for pos in state.snake.positions().chain(state.target_positions()) {
                assert!(seen.insert(pos), "overlap at {:?}", pos);
            }
        }
    }
}
