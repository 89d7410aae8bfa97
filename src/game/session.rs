//! The session: one logical actor owning the game, its economy and its input.
//!
//! All mutation goes through `&mut self`; read-only queries borrow the last
//! committed state, so they can never observe a half-applied tick.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

use crate::algorithms::{plan_route, SearchStep, SortOrder, SortStep};

use super::{
    action::{Direction, DirectionQueue},
    config::GameConfig,
    engine::{GameEngine, GameEvent, StepResult},
    entities::{EntityId, InventoryItem},
    error::SessionError,
    inventory::SortKey,
    state::{GameState, GameStats, GameStatus, Position, SessionContext},
};

pub struct GameSession<R: Rng = StdRng> {
    engine: GameEngine<R>,
    state: GameState,
    ctx: SessionContext,
    directions: DirectionQueue,
    hint_active: bool,
    hint_route: Vec<Position>,
}

impl GameSession<StdRng> {
    pub fn new(config: GameConfig, high_score: u32) -> Result<Self, SessionError> {
        Self::with_engine(GameEngine::new(config), high_score)
    }

    pub fn seeded(config: GameConfig, seed: u64, high_score: u32) -> Result<Self, SessionError> {
        Self::with_engine(GameEngine::seeded(config, seed), high_score)
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_engine(mut engine: GameEngine<R>, high_score: u32) -> Result<Self, SessionError> {
        engine.config().validate().map_err(SessionError::InvalidConfig)?;
        let ctx = SessionContext::new(engine.config());
        let state = engine.reset(&ctx, high_score)?;
        let directions = DirectionQueue::new(engine.config().max_queued_directions);

        Ok(Self {
            engine,
            state,
            ctx,
            directions,
            hint_active: false,
            hint_route: Vec::new(),
        })
    }

    /// Start playing. From GameOver or Win this restarts with a fresh board;
    /// from Paused it resumes.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.state.status {
            GameStatus::Ready => {}
            GameStatus::Playing => return Ok(()),
            GameStatus::Paused => return self.resume(),
            GameStatus::GameOver | GameStatus::Win => self.reset()?,
        }

        self.state.status = GameStatus::Playing;
        info!("Game started");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.state.status != GameStatus::Playing {
            return Err(SessionError::InvalidState("not playing"));
        }
        self.state.status = GameStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.state.status != GameStatus::Paused {
            return Err(SessionError::InvalidState("not paused"));
        }
        self.state.status = GameStatus::Playing;
        Ok(())
    }

    /// Throw the current game away and return to Ready. Coins and capacity
    /// go back to their starting values; the high score is kept.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.ctx = SessionContext::new(self.engine.config());
        self.state = self.engine.reset(&self.ctx, self.state.stats.high_score)?;
        self.directions.clear();
        self.clear_hint();
        Ok(())
    }

    /// Queue a direction change for an upcoming tick. Returns false when it
    /// was discarded (not playing, reversal, duplicate or queue full).
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        if self.state.status != GameStatus::Playing {
            return false;
        }
        self.directions.push(self.state.snake.direction, direction)
    }

    /// Switch hint mode. Returns whether it is now active.
    pub fn toggle_hint(&mut self) -> Result<bool, SessionError> {
        if self.state.status != GameStatus::Playing {
            return Err(SessionError::InvalidState("not playing"));
        }

        if self.hint_active {
            self.clear_hint();
            return Ok(false);
        }

        let targets = self.state.target_positions();
        if targets.is_empty() {
            return Err(SessionError::NoTargets);
        }
        self.hint_route = plan_route(self.state.snake.head(), &targets);
        self.hint_active = true;
        Ok(true)
    }

    /// Sell an inventory item, returning the coins gained
    pub fn sell_item(&mut self, id: EntityId) -> Result<u32, SessionError> {
        let item = self
            .state
            .inventory
            .remove(id)
            .ok_or(SessionError::ItemNotFound(id))?;

        self.ctx.coins += item.sell_value;
        self.state.stats.current_inventory_weight = self.state.inventory.weight();
        info!("Sold {} {} for {} coins", item.kind, item.id, item.sell_value);
        Ok(item.sell_value)
    }

    /// Spend coins on more hard capacity, returning the new capacity
    pub fn upgrade_capacity(&mut self) -> Result<u32, SessionError> {
        let cost = self.engine.config().capacity_upgrade_cost;
        if self.ctx.coins < cost {
            return Err(SessionError::InsufficientCoins {
                have: self.ctx.coins,
                need: cost,
            });
        }

        self.ctx.coins -= cost;
        self.ctx.inventory_capacity += self.engine.config().capacity_upgrade_step;
        info!("Inventory capacity upgraded to {}", self.ctx.inventory_capacity);
        Ok(self.ctx.inventory_capacity)
    }

    /// Change the hard capacity. A reduction below the carried weight keeps
    /// the most valuable subset that still fits; the rest is returned and lost.
    pub fn set_inventory_capacity(&mut self, capacity: u32) -> Vec<InventoryItem> {
        self.ctx.inventory_capacity = capacity;
        let dropped = self.state.inventory.prune_to(capacity);
        self.state.stats.current_inventory_weight = self.state.inventory.weight();
        if !dropped.is_empty() {
            info!("Capacity cut to {}: dropped {} items", capacity, dropped.len());
        }
        dropped
    }

    /// Sort the inventory in place, returning the recorded bubble-sort steps
    pub fn sort_inventory(&mut self, key: SortKey, order: SortOrder) -> Vec<SortStep<InventoryItem>> {
        self.state.inventory.sort(key, order)
    }

    /// Trace a scan of the inventory for a collectible type name
    pub fn search_inventory(&self, term: &str) -> Vec<SearchStep<InventoryItem>> {
        self.state.inventory.search(term)
    }

    /// Advance the game by one tick, applying at most one queued direction
    pub fn tick(&mut self) -> StepResult {
        let direction = if self.state.status == GameStatus::Playing {
            self.directions.pop(self.state.snake.direction)
        } else {
            None
        };

        let result = self.engine.step(&mut self.state, direction, &mut self.ctx);

        if result.terminated {
            self.directions.clear();
            self.clear_hint();
        } else if self.hint_active && (result.consumed || Self::new_wave(&result)) {
            self.refresh_hint();
        }

        result
    }

    fn new_wave(result: &StepResult) -> bool {
        result
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::LevelUp { .. }))
    }

    fn refresh_hint(&mut self) {
        let targets = self.state.target_positions();
        if targets.is_empty() {
            self.clear_hint();
        } else {
            self.hint_route = plan_route(self.state.snake.head(), &targets);
        }
    }

    fn clear_hint(&mut self) {
        self.hint_active = false;
        self.hint_route.clear();
    }

    /// Period the scheduler should tick at for the current length and level
    pub fn tick_interval(&self) -> Duration {
        self.engine
            .config()
            .tick_interval(self.state.snake.len(), self.state.stats.level)
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stats(&self) -> &GameStats {
        &self.state.stats
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn hint_active(&self) -> bool {
        self.hint_active
    }

    pub fn hint_route(&self) -> &[Position] {
        &self.hint_route
    }

    /// Threshold the carried weight is measured against this level
    pub fn capacity_threshold(&self) -> u32 {
        self.engine.config().capacity_threshold(self.state.stats.level)
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::CollectibleType;
    use crate::game::error::GameOverReason;

    fn session() -> GameSession {
        GameSession::seeded(GameConfig::new(20, 20), 7, 0).unwrap()
    }

    /// Leave one food item in the top-left corner and nothing else
    fn clear_board(session: &mut GameSession) {
        let state = session.state_mut();
        let mut food = state.food[0].clone();
        food.position = Position::new(0, 0);
        state.food = vec![food];
        state.collectibles.clear();
    }

    fn item(id: u64, value: u32, weight: u32) -> InventoryItem {
        InventoryItem {
            id: EntityId(id),
            kind: CollectibleType::Potion,
            value,
            weight,
            sell_value: value / 2,
            collected_at: 0,
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = GameConfig {
            initial_snake_length: 0,
            ..GameConfig::new(20, 20)
        };
        assert!(matches!(
            GameSession::seeded(config, 7, 0),
            Err(SessionError::InvalidConfig(_))
        ));
        assert!(matches!(
            GameSession::new(GameConfig::new(5, 20), 0),
            Err(SessionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_lifecycle() {
        let mut session = session();
        assert_eq!(session.status(), GameStatus::Ready);
        assert!(session.pause().is_err());

        session.start().unwrap();
        assert_eq!(session.status(), GameStatus::Playing);

        session.pause().unwrap();
        assert_eq!(session.status(), GameStatus::Paused);
        let ticks = session.state().ticks;
        session.tick();
        assert_eq!(session.state().ticks, ticks);

        session.resume().unwrap();
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut session = session();
        session.start().unwrap();
        session.state_mut().stats.score = 30;
        session.state_mut().stats.high_score = 30;
        session.state_mut().status = GameStatus::GameOver;

        session.start().unwrap();
        assert_eq!(session.status(), GameStatus::Playing);
        assert_eq!(session.stats().score, 0);
        assert_eq!(session.stats().high_score, 30);
    }

    #[test]
    fn test_queue_direction_only_while_playing() {
        let mut session = session();
        assert!(!session.queue_direction(Direction::Up));

        session.start().unwrap();
        assert!(!session.queue_direction(Direction::Left));
        assert!(session.queue_direction(Direction::Up));
    }

    #[test]
    fn test_one_direction_per_tick() {
        let mut session = session();
        session.start().unwrap();
        clear_board(&mut session);
        session.queue_direction(Direction::Up);
        session.queue_direction(Direction::Left);
        let head = session.state().snake.head();

        session.tick();
        assert_eq!(session.state().snake.direction, Direction::Up);
        assert_eq!(session.state().snake.head(), head.moved_by(0, -1));

        session.tick();
        assert_eq!(session.state().snake.direction, Direction::Left);
    }

    #[test]
    fn test_hint_toggle() {
        let mut session = session();
        assert!(session.toggle_hint().is_err());

        session.start().unwrap();
        assert_eq!(session.toggle_hint(), Ok(true));
        let route = session.hint_route();
        assert_eq!(route[0], session.state().snake.head());
        assert_eq!(route.len(), session.state().target_positions().len() + 1);

        assert_eq!(session.toggle_hint(), Ok(false));
        assert!(session.hint_route().is_empty());
    }

    #[test]
    fn test_hint_without_targets() {
        let mut session = session();
        session.start().unwrap();
        session.state_mut().food.clear();
        session.state_mut().collectibles.clear();
        assert_eq!(session.toggle_hint(), Err(SessionError::NoTargets));
    }

    #[test]
    fn test_hint_follows_new_wave_after_level_up() {
        let mut session = session();
        session.start().unwrap();
        session.toggle_hint().unwrap();
        session.state_mut().food.clear();
        session.state_mut().collectibles.clear();

        let result = session.tick();
        assert!(!result.terminated);
        assert!(matches!(
            result.events.first(),
            Some(GameEvent::LevelUp { level: 2, .. })
        ));

        let targets = session.state().target_positions();
        assert!(session.hint_active());
        assert_eq!(
            session.hint_route(),
            plan_route(session.state().snake.head(), &targets).as_slice()
        );
        assert!(session.hint_route()[1..].iter().all(|p| targets.contains(p)));
    }

    #[test]
    fn test_sell_item() {
        let mut session = session();
        session.state_mut().inventory.push(item(77, 9, 4));
        session.state_mut().stats.current_inventory_weight = 4;

        assert_eq!(session.sell_item(EntityId(77)), Ok(4));
        assert_eq!(session.context().coins, 4);
        assert_eq!(session.stats().current_inventory_weight, 0);
        assert_eq!(
            session.sell_item(EntityId(77)),
            Err(SessionError::ItemNotFound(EntityId(77)))
        );
    }

    #[test]
    fn test_upgrade_capacity_costs_coins() {
        let mut session = session();
        let base = session.context().inventory_capacity;
        assert!(matches!(
            session.upgrade_capacity(),
            Err(SessionError::InsufficientCoins { have: 0, need: 10 })
        ));

        session.state_mut().inventory.push(item(1, 40, 2));
        session.sell_item(EntityId(1)).unwrap();
        assert_eq!(session.upgrade_capacity(), Ok(base + 10));
        assert_eq!(session.context().coins, 10);
    }

    #[test]
    fn test_capacity_cut_prunes_inventory() {
        let mut session = session();
        for (id, (w, v)) in [(2, 3), (3, 4), (4, 5), (5, 6)].into_iter().enumerate() {
            session.state_mut().inventory.push(item(id as u64, v, w));
        }

        let dropped = session.set_inventory_capacity(5);
        assert_eq!(dropped.len(), 2);
        let value: u32 = session.state().inventory.items().iter().map(|i| i.value).sum();
        assert_eq!(value, 7);
        assert_eq!(session.stats().current_inventory_weight, 5);
    }

    #[test]
    fn test_game_over_clears_hint_and_queue() {
        let mut session = session();
        session.start().unwrap();
        session.toggle_hint().unwrap();
        clear_board(&mut session);
        // Straight up into the top wall
        session.queue_direction(Direction::Up);

        let mut last = None;
        for _ in 0..20 {
            let result = session.tick();
            if result.terminated {
                last = Some(result);
                break;
            }
        }

        let result = last.expect("snake should hit the wall");
        assert_eq!(
            result.events.last(),
            Some(&GameEvent::GameOver(GameOverReason::WallCollision))
        );
        assert_eq!(session.status(), GameStatus::GameOver);
        assert!(!session.hint_active());
        assert!(session.hint_route().is_empty());
    }

    #[test]
    fn test_sort_and_search_inventory() {
        let mut session = session();
        session.state_mut().inventory.push(item(1, 3, 1));
        session.state_mut().inventory.push(item(2, 9, 1));

        let steps = session.sort_inventory(SortKey::Value, SortOrder::Descending);
        assert!(!steps.is_empty());
        assert_eq!(session.state().inventory.items()[0].id, EntityId(2));

        let steps = session.search_inventory("potion");
        assert_eq!(steps.last().unwrap().found_indices, vec![0, 1]);
    }

    #[test]
    fn test_tick_interval_tracks_length() {
        let session = session();
        assert_eq!(session.tick_interval(), Duration::from_millis(197));
    }
}
