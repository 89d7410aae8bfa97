//! Error types for the simulation core

use thiserror::Error;

use super::entities::EntityId;

/// Why a session ended. Every variant is terminal for the running game.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameOverReason {
    /// The head left the grid
    #[error("Hit the wall!")]
    WallCollision,

    /// The head ran into the body
    #[error("Ran into yourself!")]
    SelfCollision,

    /// A collectible pushed the carried weight over the level threshold
    #[error("Capacity exceeded! ({weight}/{threshold})")]
    CapacityExceeded { weight: u32, threshold: u32 },

    /// The level gate was missed
    #[error("Efficiency {percent:.1}% (need {required:.0}%+)")]
    EfficiencyBelowThreshold { percent: f64, required: f64 },

    /// Spawning the next wave failed; see [`GeneratorError`]
    #[error("Board exhausted: {0}")]
    BoardExhausted(#[from] GeneratorError),
}

/// Entity generation failures. These are configuration errors, not gameplay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("no free cell left on a {width}x{height} grid")]
    NoFreeCell { width: usize, height: usize },
}

/// Errors from session-level actions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Inventory item not found: {0}")]
    ItemNotFound(EntityId),

    #[error("Not enough coins: have {have}, need {need}")]
    InsufficientCoins { have: u32, need: u32 },

    #[error("No targets available for path optimization")]
    NoTargets,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Action not allowed while {0}")]
    InvalidState(&'static str),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}
