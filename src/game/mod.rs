//! Core game logic for the snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The terminal front end and the tests drive it through [`GameSession`].

pub mod action;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod generator;
pub mod inventory;
pub mod progression;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, DirectionQueue};
pub use config::GameConfig;
pub use engine::{GameEngine, GameEvent, StepResult};
pub use entities::{
    Collectible, CollectibleType, EntityId, FoodItem, FoodType, IdAllocator, InventoryItem,
};
pub use error::{GameOverReason, GeneratorError, SessionError};
pub use inventory::{Inventory, SortKey};
pub use progression::LevelOutcome;
pub use session::GameSession;
pub use state::{GameState, GameStats, GameStatus, Position, SessionContext, Snake};
