//! knapsnake - a grid snake game with a knapsack twist
//!
//! This library provides:
//! - Core game logic and the session API (game module)
//! - Route planning, the 0/1 knapsack and traced sort/search (algorithms module)
//! - High score and leaderboard persistence (scores module)
//! - The tick scheduler driving the game loop (scheduler module)
//! - TUI rendering, input and the interactive mode (render, input, modes modules)

pub mod algorithms;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod scheduler;
pub mod scores;
